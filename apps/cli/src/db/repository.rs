//! SQLite-backed collection implementing the search, statistics and tag
//! store collaborators.

use crate::db::error::DbError;
use crate::db::schema::{SCHEMA, SCHEMA_VERSION};
use difficulty_core::collection::{self, CardSearch, StatsSource, TagStore};
use difficulty_core::{parse_query, CardId, CardView, ReviewStats, SearchNode, TagSet};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

type Result<T> = std::result::Result<T, DbError>;

/// Card as read back from the database.
#[derive(Debug, Clone, Serialize)]
pub struct CardRecord {
    pub id: CardId,
    pub deck_path: String,
    pub question: String,
    pub answer: String,
    pub tags: TagSet,
    pub stats: Option<ReviewStats>,
}

impl CardRecord {
    fn view(&self) -> CardView<'_> {
        CardView {
            id: self.id,
            deck: &self.deck_path,
            question: &self.question,
            answer: &self.answer,
            tags: &self.tags,
            stats: self.stats,
        }
    }
}

/// Card in an import file.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportCard {
    pub id: Option<CardId>,
    pub deck: String,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub stats: Option<ImportStats>,
}

/// Review statistics in an import file; absent fields stay unknown.
///
/// `reviews` is optional. Only an explicit count of zero marks the card as
/// unreviewed; otherwise availability follows the three statistics.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportStats {
    pub lapses: Option<u32>,
    pub interval_days: Option<u32>,
    pub ease_pct: Option<u32>,
    #[serde(default)]
    pub reviews: Option<u32>,
}

/// SQLite collection store.
pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let repo = Self { conn };
        repo.initialize()?;
        Ok(repo)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Insert or replace cards, their tags and statistics in one transaction.
    pub fn import_cards(&mut self, cards: &[ImportCard]) -> Result<Vec<CardId>> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(cards.len());

        for card in cards {
            let id = match card.id {
                Some(id) => {
                    tx.execute(
                        "INSERT OR REPLACE INTO cards (id, deck_path, question_text, answer_text) VALUES (?1, ?2, ?3, ?4)",
                        params![id, card.deck, card.question, card.answer],
                    )?;
                    id
                }
                None => {
                    tx.execute(
                        "INSERT INTO cards (deck_path, question_text, answer_text) VALUES (?1, ?2, ?3)",
                        params![card.deck, card.question, card.answer],
                    )?;
                    tx.last_insert_rowid()
                }
            };

            tx.execute("DELETE FROM card_tags WHERE card_id = ?1", params![id])?;
            for tag in &card.tags {
                tx.execute(
                    "INSERT OR IGNORE INTO card_tags (card_id, tag) VALUES (?1, ?2)",
                    params![id, tag],
                )?;
            }

            let stats = card.stats.clone().unwrap_or_default();
            tx.execute(
                "INSERT OR REPLACE INTO review_stats (card_id, lapses, interval_days, ease_pct, reviews_count) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, stats.lapses, stats.interval_days, stats.ease_pct, stats.reviews],
            )?;

            ids.push(id);
        }

        tx.commit()?;
        tracing::debug!(count = ids.len(), "imported cards");
        Ok(ids)
    }

    /// All cards ordered by id.
    pub fn all_cards(&self) -> Result<Vec<CardRecord>> {
        let mut tags = self.all_tags()?;
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.deck_path, c.question_text, c.answer_text,
                    s.lapses, s.interval_days, s.ease_pct, s.reviews_count
             FROM cards c
             LEFT JOIN review_stats s ON s.card_id = c.id
             ORDER BY c.id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, CardId>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    StatsRow {
                        lapses: row.get(4)?,
                        interval_days: row.get(5)?,
                        ease_pct: row.get(6)?,
                        reviews_count: row.get(7)?,
                    },
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .map(|(id, deck_path, question, answer, stats)| CardRecord {
                id,
                deck_path,
                question,
                answer,
                tags: tags.remove(&id).unwrap_or_default(),
                stats: stats.into_stats(id),
            })
            .collect())
    }

    /// Cards matching a parsed search, ordered by id.
    pub fn search(&self, node: &SearchNode) -> Result<Vec<CardRecord>> {
        Ok(self
            .all_cards()?
            .into_iter()
            .filter(|card| node.matches(&card.view()))
            .collect())
    }

    fn all_tags(&self) -> Result<HashMap<CardId, TagSet>> {
        let mut stmt = self
            .conn
            .prepare("SELECT card_id, tag FROM card_tags")?;
        let mut tags: HashMap<CardId, TagSet> = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, CardId>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (card_id, tag) = row?;
            tags.entry(card_id).or_default().insert(tag);
        }
        Ok(tags)
    }

    fn card_exists(&self, id: CardId) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM cards WHERE id = ?1",
                params![id],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn read_tags(&self, card_id: CardId) -> Result<TagSet> {
        if !self.card_exists(card_id)? {
            return Err(DbError::CardNotFound(card_id));
        }
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM card_tags WHERE card_id = ?1")?;
        let tags = stmt
            .query_map(params![card_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<TagSet, _>>()?;
        Ok(tags)
    }

    fn write_tags(&mut self, card_id: CardId, tags: &TagSet) -> Result<()> {
        if !self.card_exists(card_id)? {
            return Err(DbError::CardNotFound(card_id));
        }
        // Delete and insert commit together, so a card never ends up half-tagged.
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM card_tags WHERE card_id = ?1", params![card_id])?;
        for tag in tags {
            tx.execute(
                "INSERT INTO card_tags (card_id, tag) VALUES (?1, ?2)",
                params![card_id, tag],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn read_stats(&self, card_id: CardId) -> Result<Option<ReviewStats>> {
        if !self.card_exists(card_id)? {
            return Err(DbError::CardNotFound(card_id));
        }
        let row = self
            .conn
            .query_row(
                "SELECT lapses, interval_days, ease_pct, reviews_count FROM review_stats WHERE card_id = ?1",
                params![card_id],
                |row| {
                    Ok(StatsRow {
                        lapses: row.get(0)?,
                        interval_days: row.get(1)?,
                        ease_pct: row.get(2)?,
                        reviews_count: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(row.and_then(|r| r.into_stats(card_id)))
    }
}

/// Raw statistics columns; any column may be NULL or out of range.
struct StatsRow {
    lapses: Option<i64>,
    interval_days: Option<i64>,
    ease_pct: Option<i64>,
    reviews_count: Option<i64>,
}

impl StatsRow {
    /// Usable statistics, or `None` for cards recorded with zero reviews and
    /// for partial or negative values. A NULL review count is not a reason to
    /// skip on its own.
    fn into_stats(self, card_id: CardId) -> Option<ReviewStats> {
        if matches!(self.reviews_count, Some(n) if n <= 0) {
            return None;
        }
        let field = |value: Option<i64>, name: &str| {
            let converted = value.and_then(|v| u32::try_from(v).ok());
            if converted.is_none() {
                tracing::debug!(card_id, field = name, "review statistic missing or invalid");
            }
            converted
        };
        ReviewStats::from_parts(
            field(self.lapses, "lapses"),
            field(self.interval_days, "interval_days"),
            field(self.ease_pct, "ease_pct"),
        )
    }
}

impl CardSearch for SqliteRepository {
    fn find_cards(&self, query: &str) -> collection::Result<Vec<CardId>> {
        let node = parse_query(query)?;
        let cards = self.search(&node)?;
        Ok(cards.into_iter().map(|card| card.id).collect())
    }
}

impl StatsSource for SqliteRepository {
    fn review_stats(&self, card_id: CardId) -> collection::Result<Option<ReviewStats>> {
        self.read_stats(card_id).map_err(Into::into)
    }
}

impl TagStore for SqliteRepository {
    fn get_tags(&self, card_id: CardId) -> collection::Result<TagSet> {
        self.read_tags(card_id).map_err(Into::into)
    }

    fn set_tags(&mut self, card_id: CardId, tags: &TagSet) -> collection::Result<()> {
        self.write_tags(card_id, tags).map_err(Into::into)
    }
}
