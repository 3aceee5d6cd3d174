//! Core library for five-level difficulty tagging.
//!
//! Provides:
//! - Difficulty classifier driven by configurable thresholds
//! - Threshold configuration loading and validation
//! - Difficulty tag family (`difficulty::<Label>`) helpers
//! - Card search grammar
//! - Batch assignment and removal over a collection

pub mod batch;
pub mod classifier;
pub mod collection;
pub mod config;
pub mod error;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod query;
pub mod tags;
pub mod types;

pub use batch::{
    apply_label, clear_labels, remove_all, remove_matching, run, BatchReport, CardFailure,
    RemovalReport, RunOptions,
};
pub use classifier::{classify, describe_rules, Rule, RULES};
pub use collection::{CardSearch, Collection, StatsSource, TagStore};
pub use config::ThresholdConfig;
pub use error::{BatchError, CollectionError, ConfigError, QueryError};
pub use query::{parse_query, CardView, SearchNode};
pub use types::{CardId, DifficultyLabel, ReviewStats, TagSet};
