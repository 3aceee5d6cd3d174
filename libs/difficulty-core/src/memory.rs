//! In-memory collection for tests. Built with `cfg(test)` or the
//! `test-util` feature.

use crate::collection::{CardSearch, Result, StatsSource, TagStore};
use crate::error::CollectionError;
use crate::query::{parse_query, CardView};
use crate::types::{CardId, ReviewStats, TagSet};
use std::collections::{BTreeMap, HashSet};

/// A card held by [`MemoryCollection`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCard {
    pub deck: String,
    pub question: String,
    pub answer: String,
    pub tags: TagSet,
    pub stats: Option<ReviewStats>,
}

/// Collection backed by a `BTreeMap`, so iteration order is by card id.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    cards: BTreeMap<CardId, MemoryCard>,
    failing_writes: HashSet<CardId>,
    writes: usize,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: CardId, card: MemoryCard) {
        self.cards.insert(id, card);
    }

    pub fn card(&self, id: CardId) -> Option<&MemoryCard> {
        self.cards.get(&id)
    }

    /// Make every `set_tags` call for `id` fail.
    pub fn fail_writes_for(&mut self, id: CardId) {
        self.failing_writes.insert(id);
    }

    /// Number of successful `set_tags` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl CardSearch for MemoryCollection {
    fn find_cards(&self, query: &str) -> Result<Vec<CardId>> {
        let node = parse_query(query)?;
        Ok(self
            .cards
            .iter()
            .filter(|(id, card)| {
                node.matches(&CardView {
                    id: **id,
                    deck: &card.deck,
                    question: &card.question,
                    answer: &card.answer,
                    tags: &card.tags,
                    stats: card.stats,
                })
            })
            .map(|(id, _)| *id)
            .collect())
    }
}

impl StatsSource for MemoryCollection {
    fn review_stats(&self, card_id: CardId) -> Result<Option<ReviewStats>> {
        self.cards
            .get(&card_id)
            .map(|card| card.stats)
            .ok_or(CollectionError::CardNotFound(card_id))
    }
}

impl TagStore for MemoryCollection {
    fn get_tags(&self, card_id: CardId) -> Result<TagSet> {
        self.cards
            .get(&card_id)
            .map(|card| card.tags.clone())
            .ok_or(CollectionError::CardNotFound(card_id))
    }

    fn set_tags(&mut self, card_id: CardId, tags: &TagSet) -> Result<()> {
        if self.failing_writes.contains(&card_id) {
            return Err(CollectionError::Storage(format!(
                "write rejected for card {card_id}"
            )));
        }
        let card = self
            .cards
            .get_mut(&card_id)
            .ok_or(CollectionError::CardNotFound(card_id))?;
        card.tags = tags.clone();
        self.writes += 1;
        Ok(())
    }
}
