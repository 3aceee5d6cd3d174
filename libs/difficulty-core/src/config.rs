//! Threshold configuration.
//!
//! The config file is a JSON object whose keys map 1:1 to the fields of
//! [`ThresholdConfig`]. Unknown keys are ignored on load and preserved on
//! write; a missing or malformed key fails the load and names the key.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Numeric thresholds driving the classifier. Ease values are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub very_hard_lapses_min: u32,
    pub very_hard_ease_max_pct: u32,
    pub hard_lapses_min: u32,
    pub hard_ease_max_pct: u32,
    pub easy_lapses_max: u32,
    pub easy_ivl_min: u32,
    pub easy_ease_min_pct: u32,
    pub very_easy_ivl_min: u32,
    pub very_easy_ease_min_pct: u32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            very_hard_lapses_min: 5,
            very_hard_ease_max_pct: 200,
            hard_lapses_min: 3,
            hard_ease_max_pct: 230,
            easy_lapses_max: 0,
            easy_ivl_min: 21,
            easy_ease_min_pct: 250,
            very_easy_ivl_min: 90,
            very_easy_ease_min_pct: 280,
        }
    }
}

/// Every config key, in file order.
pub const KEYS: [&str; 9] = [
    "very_hard_lapses_min",
    "very_hard_ease_max_pct",
    "hard_lapses_min",
    "hard_ease_max_pct",
    "easy_lapses_max",
    "easy_ivl_min",
    "easy_ease_min_pct",
    "very_easy_ivl_min",
    "very_easy_ease_min_pct",
];

impl ThresholdConfig {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_value(&value)
    }

    /// Validate an already parsed JSON value.
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or(ConfigError::NotAnObject)?;
        let mut cfg = Self::default();
        for key in KEYS {
            let raw = map.get(key).ok_or(ConfigError::MissingKey { key })?;
            let value = parse_threshold(key, raw)?;
            if let Some(field) = cfg.field_mut(key) {
                *field = value;
            }
        }
        Ok(cfg)
    }

    /// Get a threshold by key name.
    pub fn get(&self, key: &str) -> Option<u32> {
        let value = match key {
            "very_hard_lapses_min" => self.very_hard_lapses_min,
            "very_hard_ease_max_pct" => self.very_hard_ease_max_pct,
            "hard_lapses_min" => self.hard_lapses_min,
            "hard_ease_max_pct" => self.hard_ease_max_pct,
            "easy_lapses_max" => self.easy_lapses_max,
            "easy_ivl_min" => self.easy_ivl_min,
            "easy_ease_min_pct" => self.easy_ease_min_pct,
            "very_easy_ivl_min" => self.very_easy_ivl_min,
            "very_easy_ease_min_pct" => self.very_easy_ease_min_pct,
            _ => return None,
        };
        Some(value)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut u32> {
        let field = match key {
            "very_hard_lapses_min" => &mut self.very_hard_lapses_min,
            "very_hard_ease_max_pct" => &mut self.very_hard_ease_max_pct,
            "hard_lapses_min" => &mut self.hard_lapses_min,
            "hard_ease_max_pct" => &mut self.hard_ease_max_pct,
            "easy_lapses_max" => &mut self.easy_lapses_max,
            "easy_ivl_min" => &mut self.easy_ivl_min,
            "easy_ease_min_pct" => &mut self.easy_ease_min_pct,
            "very_easy_ivl_min" => &mut self.very_easy_ivl_min,
            "very_easy_ease_min_pct" => &mut self.very_easy_ease_min_pct,
            _ => return None,
        };
        Some(field)
    }

    /// Write the known keys over `base`, leaving any other keys intact.
    pub fn merge_into(&self, base: &mut Map<String, Value>) {
        for key in KEYS {
            if let Some(value) = self.get(key) {
                base.insert(key.to_string(), Value::from(value));
            }
        }
    }
}

/// Set a single known key inside a raw config document.
///
/// The value is validated before it is written; unknown keys are rejected so
/// typos do not silently land in the file.
pub fn set_key(document: &mut Map<String, Value>, key: &str, value: &str) -> Result<()> {
    let key = KEYS
        .into_iter()
        .find(|k| *k == key)
        .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    let parsed = value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        })?;
    document.insert(key.to_string(), Value::from(parsed));
    Ok(())
}

fn parse_threshold(key: &'static str, raw: &Value) -> Result<u32> {
    let invalid = || ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    };
    match raw {
        Value::Number(n) => {
            // Accept integral floats such as `250.0`, which JSON editors emit.
            if let Some(v) = n.as_u64() {
                u32::try_from(v).map_err(|_| invalid())
            } else if let Some(f) = n.as_f64() {
                if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
                    Ok(f as u32)
                } else {
                    Err(invalid())
                }
            } else {
                Err(invalid())
            }
        }
        _ => Err(invalid()),
    }
}
