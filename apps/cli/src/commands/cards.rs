//! Collection import and listing.

use super::open_repository;
use crate::db::{CardRecord, ImportCard};
use crate::paths::AppPaths;
use anyhow::Context;
use difficulty_core::{parse_query, tags};
use std::fs;
use std::path::Path;

/// Import cards from a JSON array file. Returns the number of cards written.
pub fn import(paths: &AppPaths, file: &Path) -> anyhow::Result<usize> {
    let content =
        fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let cards: Vec<ImportCard> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid card list", file.display()))?;

    let mut repo = open_repository(&paths.db)?;
    let ids = repo.import_cards(&cards)?;
    tracing::info!(count = ids.len(), file = %file.display(), "import finished");
    Ok(ids.len())
}

/// Cards matching `query`.
pub fn list(paths: &AppPaths, query: &str) -> anyhow::Result<Vec<CardRecord>> {
    let node = parse_query(query)?;
    let repo = open_repository(&paths.db)?;
    Ok(repo.search(&node)?)
}

pub fn render(cards: &[CardRecord]) -> String {
    let mut out = String::new();
    for card in cards {
        let stats = match card.stats {
            Some(s) => format!("lapses={} ivl={}d ease={}%", s.lapses, s.interval_days, s.ease_pct),
            None => "no reviews".to_string(),
        };
        let label = tags::labels_in(&card.tags)
            .first()
            .map_or("-", |l| l.as_str());
        let tag_list: Vec<&str> = card.tags.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "{:>6}  {:<20} {:<9} {:<32} {}\n",
            card.id,
            card.deck_path,
            label,
            stats,
            tag_list.join(" ")
        ));
    }
    out.push_str(&format!("{} cards\n", cards.len()));
    out
}
