//! Collaborator traits for the card collection.

use crate::error::CollectionError;
use crate::types::{CardId, ReviewStats, TagSet};

pub type Result<T> = std::result::Result<T, CollectionError>;

/// Resolves a search query to card ids.
pub trait CardSearch {
    /// Find cards matching `query`. A blank query returns every card.
    fn find_cards(&self, query: &str) -> Result<Vec<CardId>>;
}

/// Supplies review statistics.
pub trait StatsSource {
    /// Statistics for a card, or `None` if it has no usable review history.
    fn review_stats(&self, card_id: CardId) -> Result<Option<ReviewStats>>;
}

/// Reads and writes card tags.
pub trait TagStore {
    fn get_tags(&self, card_id: CardId) -> Result<TagSet>;

    /// Replace the whole tag set of a card in one write.
    fn set_tags(&mut self, card_id: CardId, tags: &TagSet) -> Result<()>;
}

/// A store providing all three collaborators.
pub trait Collection: CardSearch + StatsSource + TagStore {}

impl<T: CardSearch + StatsSource + TagStore> Collection for T {}
