//! End-to-end tagging against an on-disk collection.

mod common;

use common::TestContext;
use difficulty_core::{tags, DifficultyLabel, RunOptions};
use difficulty_tagger::commands::{assign, cards, config, remove};
use pretty_assertions::assert_eq;
use std::fs;

fn labels(ctx: &TestContext, query: &str) -> Vec<(i64, Vec<DifficultyLabel>)> {
    cards::list(&ctx.paths, query)
        .unwrap()
        .into_iter()
        .map(|card| (card.id, tags::labels_in(&card.tags)))
        .collect()
}

#[test]
fn assign_tags_whole_collection() {
    let ctx = TestContext::new().with_sample_cards();
    let report = assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();

    assert_eq!(report.matched, 6);
    assert_eq!(report.labelled(), 5);
    assert_eq!(report.skipped, 1);
    assert!(report.failures.is_empty());
    for label in DifficultyLabel::ALL {
        assert_eq!(report.assigned[&label], 1, "{label}");
    }

    assert_eq!(
        labels(&ctx, ""),
        vec![
            (1, vec![DifficultyLabel::VeryHard]),
            (2, vec![DifficultyLabel::VeryEasy]),
            (3, vec![DifficultyLabel::Easy]),
            (4, vec![DifficultyLabel::Medium]),
            (5, vec![DifficultyLabel::Hard]),
            (6, vec![]),
        ]
    );
}

#[test]
fn assign_respects_query() {
    let ctx = TestContext::new().with_sample_cards();
    let report = assign::execute(&ctx.paths, "deck:French -tag:verbs", RunOptions::default()).unwrap();
    assert_eq!(report.matched, 2);
    assert_eq!(labels(&ctx, "cid:1"), vec![(1, vec![])]);
    assert_eq!(labels(&ctx, "cid:4,5"), vec![(4, vec![]), (5, vec![])]);
}

#[test]
fn second_run_changes_nothing() {
    let ctx = TestContext::new().with_sample_cards();
    assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();
    let report = assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();
    assert_eq!(report.changed, 0);
    assert_eq!(report.labelled(), 5);
}

#[test]
fn threshold_change_reclassifies() {
    let ctx = TestContext::new().with_sample_cards();
    assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();

    // Card 3 (interval 30) becomes VeryEasy once the interval bar drops.
    config::set(&ctx.paths.config, "very_easy_ivl_min", "30").unwrap();
    config::set(&ctx.paths.config, "very_easy_ease_min_pct", "260").unwrap();
    assign::execute(&ctx.paths, "cid:3", RunOptions::default()).unwrap();

    let card = cards::list(&ctx.paths, "cid:3").unwrap().remove(0);
    assert_eq!(tags::labels_in(&card.tags), vec![DifficultyLabel::VeryEasy]);
    assert!(!card.tags.contains("difficulty::Easy"));
}

#[test]
fn broken_config_stops_before_any_card() {
    let ctx = TestContext::new().with_sample_cards();
    fs::write(&ctx.paths.config, r#"{"very_hard_lapses_min": 5, "hard_lapses_min": "x"}"#).unwrap();

    let err = assign::execute(&ctx.paths, "", RunOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("very_hard_ease_max_pct"));
    assert_eq!(labels(&ctx, "cid:3"), vec![(3, vec![DifficultyLabel::Hard])]);
}

#[test]
fn invalid_query_is_reported_verbatim() {
    let ctx = TestContext::new().with_sample_cards();
    let err = assign::execute(&ctx.paths, "deck:French or", RunOptions::default()).unwrap_err();
    assert!(err.to_string().contains("`or` is missing an operand"));
    assert_eq!(labels(&ctx, "cid:1"), vec![(1, vec![])]);
}

#[test]
fn dry_run_leaves_tags_alone() {
    let ctx = TestContext::new().with_sample_cards();
    let options = RunOptions {
        dry_run: true,
        ..Default::default()
    };
    let report = assign::execute(&ctx.paths, "", options).unwrap();
    assert_eq!(report.changed, 5);
    assert!(assign::render(&report).starts_with("Would assign"));
    assert_eq!(labels(&ctx, "tag:difficulty::*").len(), 1);
}

#[test]
fn remove_strips_only_difficulty_tags() {
    let ctx = TestContext::new().with_sample_cards();
    assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();

    let report = remove::execute(&ctx.paths, "deck:German", RunOptions::default()).unwrap();
    assert_eq!(report.examined, 3);
    assert_eq!(report.modified, 2);

    let german = cards::list(&ctx.paths, "deck:German").unwrap();
    assert!(german.iter().all(|c| tags::labels_in(&c.tags).is_empty()));
    assert!(german.iter().any(|c| c.tags.contains("leech")));
    assert_eq!(labels(&ctx, "cid:1"), vec![(1, vec![DifficultyLabel::VeryHard])]);
}

#[test]
fn render_reports_empty_match() {
    let ctx = TestContext::new().with_sample_cards();
    let report = assign::execute(&ctx.paths, "deck:Japanese", RunOptions::default()).unwrap();
    assert_eq!(assign::render(&report), "No cards matched the search.\n");
}

#[test]
fn import_without_review_count_still_classifies() {
    let ctx = TestContext::new();
    let file = ctx.write_file(
        "cards.json",
        r#"[
            {"id": 1, "deck": "French", "question": "q", "answer": "a",
             "stats": {"lapses": 6, "interval_days": 5, "ease_pct": 180}},
            {"id": 2, "deck": "French", "question": "q", "answer": "a",
             "stats": {"lapses": 0, "interval_days": 0, "ease_pct": 250, "reviews": 0}}
        ]"#,
    );
    assert_eq!(cards::import(&ctx.paths, &file).unwrap(), 2);

    let report = assign::execute(&ctx.paths, "", RunOptions::default()).unwrap();
    assert_eq!(report.labelled(), 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(
        labels(&ctx, ""),
        vec![(1, vec![DifficultyLabel::VeryHard]), (2, vec![])]
    );
}
