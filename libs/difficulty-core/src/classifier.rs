//! Five-level difficulty classifier.
//!
//! Rules are an ordered table evaluated top to bottom; the first matching
//! rule decides the label and [`DifficultyLabel::Medium`] is the fallback.
//! Hardness rules come before leniency rules, and VeryEasy is checked before
//! Easy. All bounds are inclusive.

use crate::config::ThresholdConfig;
use crate::types::{DifficultyLabel, ReviewStats};

/// A single classification rule.
#[derive(Clone, Copy)]
pub struct Rule {
    pub label: DifficultyLabel,
    pub matches: fn(&ReviewStats, &ThresholdConfig) -> bool,
    /// Condition text with the active thresholds filled in.
    pub condition: fn(&ThresholdConfig) -> String,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("label", &self.label).finish()
    }
}

/// Rules in evaluation order. Medium is not listed; it is the fallback.
pub const RULES: [Rule; 4] = [
    Rule {
        label: DifficultyLabel::VeryHard,
        matches: is_very_hard,
        condition: describe_very_hard,
    },
    Rule {
        label: DifficultyLabel::Hard,
        matches: is_hard,
        condition: describe_hard,
    },
    Rule {
        label: DifficultyLabel::VeryEasy,
        matches: is_very_easy,
        condition: describe_very_easy,
    },
    Rule {
        label: DifficultyLabel::Easy,
        matches: is_easy,
        condition: describe_easy,
    },
];

/// Label used when no rule matches.
pub const FALLBACK: DifficultyLabel = DifficultyLabel::Medium;

/// Classify a card from its review statistics.
pub fn classify(stats: &ReviewStats, cfg: &ThresholdConfig) -> DifficultyLabel {
    RULES
        .iter()
        .find(|rule| (rule.matches)(stats, cfg))
        .map_or(FALLBACK, |rule| rule.label)
}

fn is_very_hard(s: &ReviewStats, cfg: &ThresholdConfig) -> bool {
    s.lapses >= cfg.very_hard_lapses_min && s.ease_pct <= cfg.very_hard_ease_max_pct
}

fn is_hard(s: &ReviewStats, cfg: &ThresholdConfig) -> bool {
    s.lapses >= cfg.hard_lapses_min && s.ease_pct <= cfg.hard_ease_max_pct
}

fn is_very_easy(s: &ReviewStats, cfg: &ThresholdConfig) -> bool {
    s.interval_days >= cfg.very_easy_ivl_min && s.ease_pct >= cfg.very_easy_ease_min_pct
}

fn is_easy(s: &ReviewStats, cfg: &ThresholdConfig) -> bool {
    s.lapses <= cfg.easy_lapses_max
        && s.interval_days >= cfg.easy_ivl_min
        && s.ease_pct >= cfg.easy_ease_min_pct
}

fn describe_very_hard(cfg: &ThresholdConfig) -> String {
    format!(
        "lapses >= {} and ease <= {}%",
        cfg.very_hard_lapses_min, cfg.very_hard_ease_max_pct
    )
}

fn describe_hard(cfg: &ThresholdConfig) -> String {
    format!("lapses >= {} and ease <= {}%", cfg.hard_lapses_min, cfg.hard_ease_max_pct)
}

fn describe_very_easy(cfg: &ThresholdConfig) -> String {
    format!(
        "interval >= {} days and ease >= {}%",
        cfg.very_easy_ivl_min, cfg.very_easy_ease_min_pct
    )
}

fn describe_easy(cfg: &ThresholdConfig) -> String {
    format!(
        "lapses <= {} and interval >= {} days and ease >= {}%",
        cfg.easy_lapses_max, cfg.easy_ivl_min, cfg.easy_ease_min_pct
    )
}

/// Human-readable rule chain with the active thresholds, one line per rule.
pub fn describe_rules(cfg: &ThresholdConfig) -> Vec<String> {
    let mut lines: Vec<String> = RULES
        .iter()
        .enumerate()
        .map(|(i, rule)| format!("{}. {}: {}", i + 1, rule.label, (rule.condition)(cfg)))
        .collect();
    lines.push(format!("{}. {}: otherwise", RULES.len() + 1, FALLBACK));
    lines
}
