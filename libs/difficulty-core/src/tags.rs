//! Difficulty tag family.
//!
//! Each label maps to one tag `difficulty::<Label>`. Tag comparison is ASCII
//! case-insensitive, matching how collection tags behave.

use crate::types::{DifficultyLabel, TagSet};

/// Namespace prefix shared by the five difficulty tags.
pub const TAG_PREFIX: &str = "difficulty::";

/// Tag name for a label.
pub fn tag_for(label: DifficultyLabel) -> String {
    format!("{TAG_PREFIX}{}", label.as_str())
}

/// Label encoded by a tag, if it belongs to the difficulty family.
pub fn label_of(tag: &str) -> Option<DifficultyLabel> {
    let prefix = tag.get(..TAG_PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(TAG_PREFIX) {
        return None;
    }
    DifficultyLabel::from_str(&tag[TAG_PREFIX.len()..])
}

/// Whether a tag is one of the five difficulty tags.
pub fn is_difficulty_tag(tag: &str) -> bool {
    label_of(tag).is_some()
}

/// Replace any difficulty tag with the one for `label`.
///
/// Computed as one set difference followed by one union so callers can write
/// the result in a single step.
pub fn with_label(tags: &TagSet, label: DifficultyLabel) -> TagSet {
    let mut next = without_difficulty(tags);
    next.insert(tag_for(label));
    next
}

/// All tags except the difficulty family.
pub fn without_difficulty(tags: &TagSet) -> TagSet {
    tags.iter()
        .filter(|tag| !is_difficulty_tag(tag))
        .cloned()
        .collect()
}

/// Difficulty labels currently present in a tag set.
pub fn labels_in(tags: &TagSet) -> Vec<DifficultyLabel> {
    tags.iter().filter_map(|tag| label_of(tag)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn set(tags: &[&str]) -> TagSet {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn tag_names() {
        assert_eq!(tag_for(DifficultyLabel::VeryHard), "difficulty::VeryHard");
        assert_eq!(tag_for(DifficultyLabel::Medium), "difficulty::Medium");
    }

    #[test]
    fn recognizes_family_case_insensitively() {
        assert_eq!(label_of("difficulty::Hard"), Some(DifficultyLabel::Hard));
        assert_eq!(label_of("DIFFICULTY::veryeasy"), Some(DifficultyLabel::VeryEasy));
        assert_eq!(label_of("difficulty::Brutal"), None);
        assert_eq!(label_of("Hard"), None);
        assert_eq!(label_of("difficulty::"), None);
        assert_eq!(label_of("dif"), None);
    }

    #[test]
    fn reclassify_replaces_old_label() {
        let tags = set(&["vocab", "difficulty::Hard"]);
        let next = with_label(&tags, DifficultyLabel::VeryEasy);
        assert_eq!(next, set(&["vocab", "difficulty::VeryEasy"]));
        assert_eq!(labels_in(&next), vec![DifficultyLabel::VeryEasy]);
    }

    #[test]
    fn same_label_is_stable() {
        let tags = set(&["difficulty::Easy", "verbs"]);
        assert_eq!(with_label(&tags, DifficultyLabel::Easy), tags);
    }

    #[test]
    fn stray_duplicates_collapse_to_one_label() {
        let tags = set(&["difficulty::Hard", "difficulty::medium", "x"]);
        let next = with_label(&tags, DifficultyLabel::Medium);
        assert_eq!(next, set(&["difficulty::Medium", "x"]));
    }

    #[test]
    fn strip_keeps_unrelated_tags() {
        let tags = set(&["difficulty::VeryHard", "difficulty-notes", "Hard"]);
        assert_eq!(without_difficulty(&tags), set(&["difficulty-notes", "Hard"]));
    }
}
