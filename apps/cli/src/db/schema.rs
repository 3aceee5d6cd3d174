//! SQLite schema definitions.

/// Current schema version for migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema for the local collection database.
pub const SCHEMA: &str = r#"
-- Cards
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY,
    deck_path TEXT NOT NULL,
    question_text TEXT NOT NULL,
    answer_text TEXT NOT NULL
);

-- Review statistics; NULL columns mean the value is unknown,
-- reviews_count = 0 marks an unreviewed card
CREATE TABLE IF NOT EXISTS review_stats (
    card_id INTEGER PRIMARY KEY REFERENCES cards(id),
    lapses INTEGER,
    interval_days INTEGER,
    ease_pct INTEGER,
    reviews_count INTEGER
);

-- Card tags
CREATE TABLE IF NOT EXISTS card_tags (
    card_id INTEGER NOT NULL REFERENCES cards(id),
    tag TEXT NOT NULL,
    PRIMARY KEY (card_id, tag)
);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_path);
CREATE INDEX IF NOT EXISTS idx_card_tags_tag ON card_tags(tag);
"#;
