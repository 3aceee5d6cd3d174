//! Core types for difficulty classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Card identifier as used by the collection store.
pub type CardId = i64;

/// Set of tags attached to a card.
pub type TagSet = BTreeSet<String>;

/// Review statistics of a single card, already computed by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub lapses: u32,
    pub interval_days: u32,
    /// Ease factor as a percentage (250 = 250%).
    pub ease_pct: u32,
}

impl ReviewStats {
    pub fn new(lapses: u32, interval_days: u32, ease_pct: u32) -> Self {
        Self {
            lapses,
            interval_days,
            ease_pct,
        }
    }

    /// Build stats from possibly partial fields.
    ///
    /// Returns `None` if any field is absent; a missing value is never
    /// treated as zero.
    pub fn from_parts(
        lapses: Option<u32>,
        interval_days: Option<u32>,
        ease_pct: Option<u32>,
    ) -> Option<Self> {
        Some(Self::new(lapses?, interval_days?, ease_pct?))
    }
}

/// Difficulty label, listed in rule evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DifficultyLabel {
    VeryHard,
    Hard,
    VeryEasy,
    Easy,
    Medium,
}

impl DifficultyLabel {
    /// All labels in rule evaluation order.
    pub const ALL: [DifficultyLabel; 5] = [
        Self::VeryHard,
        Self::Hard,
        Self::VeryEasy,
        Self::Easy,
        Self::Medium,
    ];

    /// Get the label name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryHard => "VeryHard",
            Self::Hard => "Hard",
            Self::VeryEasy => "VeryEasy",
            Self::Easy => "Easy",
            Self::Medium => "Medium",
        }
    }

    /// Parse from a label name (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for DifficultyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
