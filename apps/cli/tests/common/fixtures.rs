//! Test fixtures.

use serde_json::{json, Value};

/// Cards covering every label plus an unreviewed card.
///
/// With the default thresholds: 1 → VeryHard, 2 → VeryEasy, 3 → Easy,
/// 4 → Medium, 5 → Hard, 6 → skipped.
pub fn sample_cards() -> Value {
    json!([
        card(1, "French", &["verbs"], Some((6, 5, 180))),
        card(2, "French::Food", &[], Some((0, 120, 300))),
        card(3, "French::Food", &["difficulty::Hard"], Some((0, 30, 260))),
        card(4, "German", &[], Some((1, 10, 220))),
        card(5, "German", &["leech"], Some((3, 2, 215))),
        card(6, "German", &[], None),
    ])
}

pub fn card(id: i64, deck: &str, tags: &[&str], stats: Option<(u32, u32, u32)>) -> Value {
    let mut card = json!({
        "id": id,
        "deck": deck,
        "question": format!("Question {id}?"),
        "answer": format!("Answer {id}."),
        "tags": tags,
    });
    if let Some((lapses, interval_days, ease_pct)) = stats {
        card["stats"] = json!({
            "lapses": lapses,
            "interval_days": interval_days,
            "ease_pct": ease_pct,
            "reviews": 10,
        });
    }
    card
}
