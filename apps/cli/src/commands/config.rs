//! Threshold config file management.
//!
//! Edits go through a raw JSON document so keys this tool does not know
//! about survive a rewrite.

use anyhow::{bail, Context};
use difficulty_core::config::{self, KEYS};
use difficulty_core::{describe_rules, ThresholdConfig};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Load and validate the config. Any error names the file and the key.
pub fn load(path: &Path) -> anyhow::Result<ThresholdConfig> {
    ThresholdConfig::load(path)
        .with_context(|| format!("invalid threshold config {}", path.display()))
}

/// Write the default thresholds to `path`.
pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let mut document = Map::new();
    ThresholdConfig::default().merge_into(&mut document);
    write_document(path, &document)?;
    tracing::info!(path = %path.display(), "wrote default config");
    Ok(())
}

/// Render the validated config and the resulting rule chain.
pub fn show(path: &Path) -> anyhow::Result<String> {
    let cfg = load(path)?;
    let mut out = format!("# {}\n", path.display());
    for key in KEYS {
        if let Some(value) = cfg.get(key) {
            out.push_str(&format!("{key} = {value}\n"));
        }
    }
    out.push_str("\nRules are evaluated in this order:\n");
    for line in describe_rules(&cfg) {
        out.push_str(&format!("  {line}\n"));
    }
    Ok(out)
}

/// Update one key. A missing file starts from the defaults.
pub fn set(path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let mut document = read_document(path)?;
    config::set_key(&mut document, key, value)?;
    write_document(path, &document)?;

    if let Err(e) = ThresholdConfig::from_value(&Value::Object(document)) {
        tracing::warn!(error = %e, "config is still incomplete");
    }
    Ok(())
}

/// Restore every known key to its default, keeping unknown keys.
pub fn reset(path: &Path) -> anyhow::Result<()> {
    let mut document = read_document(path)?;
    ThresholdConfig::default().merge_into(&mut document);
    write_document(path, &document)
}

fn read_document(path: &Path) -> anyhow::Result<Map<String, Value>> {
    if !path.exists() {
        let mut document = Map::new();
        ThresholdConfig::default().merge_into(&mut document);
        return Ok(document);
    }
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    match serde_json::from_str::<Value>(&content)
        .with_context(|| format!("{} is not valid JSON", path.display()))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn write_document(path: &Path, document: &Map<String, Value>) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(document)?;
    fs::write(path, content + "\n").with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn init_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        init(&path, false).unwrap();
        assert_eq!(load(&path).unwrap(), ThresholdConfig::default());
        assert!(init(&path, false).is_err());
        init(&path, true).unwrap();
    }

    #[test]
    fn missing_key_error_names_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"very_hard_lapses_min": 5}"#).unwrap();
        let err = load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("very_hard_ease_max_pct"));
    }

    #[test]
    fn set_preserves_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        init(&path, false).unwrap();

        let mut document = read_document(&path).unwrap();
        document.insert("ui_note".into(), Value::from("hello"));
        write_document(&path, &document).unwrap();

        set(&path, "easy_ivl_min", "30").unwrap();
        let cfg = load(&path).unwrap();
        assert_eq!(cfg.easy_ivl_min, 30);
        assert_eq!(read_document(&path).unwrap()["ui_note"], Value::from("hello"));
    }

    #[test]
    fn set_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        assert!(set(&path, "easy_ivl", "30").is_err());
        assert!(set(&path, "easy_ivl_min", "soon").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn reset_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        set(&path, "hard_lapses_min", "8").unwrap();
        reset(&path).unwrap();
        assert_eq!(load(&path).unwrap(), ThresholdConfig::default());
    }

    #[test]
    fn show_lists_rules() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        init(&path, false).unwrap();
        let out = show(&path).unwrap();
        assert!(out.contains("hard_lapses_min = 3"));
        assert!(out.contains("1. VeryHard: lapses >= 5 and ease <= 200%"));
    }
}
