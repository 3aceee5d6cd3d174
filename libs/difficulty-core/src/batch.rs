//! Batch operations over a collection: tag assignment and removal.
//!
//! Cards are processed one at a time and each card's read-classify-write is
//! independent, so a failure or an abort never affects other cards. Work done
//! before an abort is kept.

use crate::classifier::classify;
use crate::collection::{Collection, Result as CollectionResult, TagStore};
use crate::config::ThresholdConfig;
use crate::error::BatchError;
use crate::tags;
use crate::types::{CardId, DifficultyLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Options shared by batch operations.
#[derive(Default, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Compute the outcome without writing any tags.
    pub dry_run: bool,
    /// Checked before each card; once set, remaining cards are skipped.
    pub cancel: Option<&'a AtomicBool>,
    /// Called after each card with `(done, total)`.
    pub progress: Option<&'a (dyn Fn(usize, usize) + Sync)>,
}

impl RunOptions<'_> {
    fn cancelled(&self) -> bool {
        self.cancel.map_or(false, |flag| flag.load(Ordering::Relaxed))
    }

    fn report_progress(&self, done: usize, total: usize) {
        if let Some(progress) = self.progress {
            progress(done, total);
        }
    }
}

/// A card that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardFailure {
    pub card_id: CardId,
    pub message: String,
}

/// Outcome of [`run`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub query: String,
    /// Cards returned by the search.
    pub matched: usize,
    /// Cards per assigned label, all five labels present.
    pub assigned: BTreeMap<DifficultyLabel, usize>,
    /// Cards whose tag set was rewritten.
    pub changed: usize,
    /// Cards without usable review statistics.
    pub skipped: usize,
    pub failures: Vec<CardFailure>,
    pub cancelled: bool,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    fn new(query: &str, dry_run: bool) -> Self {
        let now = Utc::now();
        Self {
            query: query.to_string(),
            matched: 0,
            assigned: DifficultyLabel::ALL.into_iter().map(|l| (l, 0)).collect(),
            changed: 0,
            skipped: 0,
            failures: Vec::new(),
            cancelled: false,
            dry_run,
            started_at: now,
            finished_at: now,
        }
    }

    /// Total number of labelled cards.
    pub fn labelled(&self) -> usize {
        self.assigned.values().sum()
    }
}

/// Outcome of [`remove_all`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RemovalReport {
    pub examined: usize,
    /// Cards that carried at least one difficulty tag.
    pub modified: usize,
    pub failures: Vec<CardFailure>,
    pub cancelled: bool,
    pub dry_run: bool,
}

/// Tag a card with `label`, replacing any other difficulty tag.
///
/// Returns `true` if the tag set changed. Re-applying the current label
/// writes nothing.
pub fn apply_label<S: TagStore + ?Sized>(
    store: &mut S,
    card_id: CardId,
    label: DifficultyLabel,
) -> CollectionResult<bool> {
    let current = store.get_tags(card_id)?;
    let next = tags::with_label(&current, label);
    if next == current {
        return Ok(false);
    }
    store.set_tags(card_id, &next)?;
    Ok(true)
}

/// Strip all difficulty tags from a card. Returns `true` if any were present.
pub fn clear_labels<S: TagStore + ?Sized>(store: &mut S, card_id: CardId) -> CollectionResult<bool> {
    let current = store.get_tags(card_id)?;
    let next = tags::without_difficulty(&current);
    if next.len() == current.len() {
        return Ok(false);
    }
    store.set_tags(card_id, &next)?;
    Ok(true)
}

/// Classify and tag every card matching `query`.
///
/// An invalid query aborts before any card is touched. Cards without
/// statistics are skipped rather than labelled Medium.
pub fn run<C: Collection + ?Sized>(
    collection: &mut C,
    query: &str,
    cfg: &ThresholdConfig,
    options: RunOptions<'_>,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::new(query, options.dry_run);
    let card_ids = collection.find_cards(query).map_err(BatchError::Search)?;
    report.matched = card_ids.len();
    tracing::info!(query, cards = card_ids.len(), dry_run = options.dry_run, "assigning difficulty tags");

    for (done, &card_id) in card_ids.iter().enumerate() {
        if options.cancelled() {
            tracing::warn!(processed = done, remaining = card_ids.len() - done, "assignment cancelled");
            report.cancelled = true;
            break;
        }

        match process_card(collection, card_id, cfg, options.dry_run) {
            Ok(Outcome::Skipped) => {
                tracing::debug!(card_id, "no review statistics, skipped");
                report.skipped += 1;
            }
            Ok(Outcome::Labelled { label, changed }) => {
                tracing::debug!(card_id, %label, changed, "classified");
                *report.assigned.entry(label).or_default() += 1;
                if changed {
                    report.changed += 1;
                }
            }
            Err(e) => {
                tracing::warn!(card_id, error = %e, "failed to tag card");
                report.failures.push(CardFailure {
                    card_id,
                    message: e.to_string(),
                });
            }
        }

        options.report_progress(done + 1, card_ids.len());
    }

    report.finished_at = Utc::now();
    tracing::info!(
        labelled = report.labelled(),
        changed = report.changed,
        skipped = report.skipped,
        failed = report.failures.len(),
        "assignment finished"
    );
    Ok(report)
}

enum Outcome {
    Skipped,
    Labelled { label: DifficultyLabel, changed: bool },
}

fn process_card<C: Collection + ?Sized>(
    collection: &mut C,
    card_id: CardId,
    cfg: &ThresholdConfig,
    dry_run: bool,
) -> CollectionResult<Outcome> {
    let Some(stats) = collection.review_stats(card_id)? else {
        return Ok(Outcome::Skipped);
    };
    let label = classify(&stats, cfg);

    let changed = if dry_run {
        let current = collection.get_tags(card_id)?;
        tags::with_label(&current, label) != current
    } else {
        apply_label(collection, card_id, label)?
    };

    Ok(Outcome::Labelled { label, changed })
}

/// Remove difficulty tags from the given cards. Other tags are untouched.
pub fn remove_all<S: TagStore + ?Sized>(
    store: &mut S,
    card_ids: &[CardId],
    options: RunOptions<'_>,
) -> RemovalReport {
    let mut report = RemovalReport {
        dry_run: options.dry_run,
        ..Default::default()
    };
    tracing::info!(cards = card_ids.len(), dry_run = options.dry_run, "removing difficulty tags");

    for (done, &card_id) in card_ids.iter().enumerate() {
        if options.cancelled() {
            tracing::warn!(processed = done, "removal cancelled");
            report.cancelled = true;
            break;
        }
        report.examined += 1;

        let result = if options.dry_run {
            store
                .get_tags(card_id)
                .map(|current| !tags::labels_in(&current).is_empty())
        } else {
            clear_labels(store, card_id)
        };

        match result {
            Ok(true) => report.modified += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(card_id, error = %e, "failed to remove tags");
                report.failures.push(CardFailure {
                    card_id,
                    message: e.to_string(),
                });
            }
        }

        options.report_progress(done + 1, card_ids.len());
    }

    tracing::info!(modified = report.modified, failed = report.failures.len(), "removal finished");
    report
}

/// Remove difficulty tags from every card matching `query`.
pub fn remove_matching<C: Collection + ?Sized>(
    collection: &mut C,
    query: &str,
    options: RunOptions<'_>,
) -> Result<RemovalReport, BatchError> {
    let card_ids = collection.find_cards(query).map_err(BatchError::Search)?;
    Ok(remove_all(collection, &card_ids, options))
}
