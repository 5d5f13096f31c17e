//! End-to-end ranker scenarios straight out of spec.md §8.

use clipkeep_core::ItemId;
use clipkeep_rank::{rank, CandidateDoc};

fn doc(id: u64, text: &str, ts: i64) -> CandidateDoc {
    CandidateDoc {
        item_id: ItemId(id),
        searchable_text: text.to_string(),
        timestamp: ts,
        bm25_score: 0.0,
    }
}

#[test]
fn scenario_1_prefix_beats_substring() {
    let now = 1_000_000_000_000;
    let candidates = vec![doc(1, "hello world foo", now), doc(2, "say hello world", now)];
    let ranked = rank("hello wo", &candidates, now);
    assert_eq!(ranked[0].item_id, ItemId(1));
    assert_eq!(ranked[0].score.intent_tier, 4);
    assert_eq!(ranked[1].item_id, ItemId(2));
    assert_eq!(ranked[1].score.intent_tier, 3);
}

#[test]
fn scenario_2_recency_breaks_ties() {
    let now = 1_000_000_000_000;
    let hour = 3_600_000;
    let candidates = vec![
        doc(1, "alpha beta gamma1", now - hour),
        doc(2, "alpha beta gamma2", now - 60_000),
    ];
    let ranked = rank("alpha gamma", &candidates, now);
    assert_eq!(ranked[0].item_id, ItemId(2));
}

#[test]
fn scenario_3_typo_handled_below_word_length_three() {
    let now = 0;
    let candidates = vec![doc(1, "imprt", now)];
    let ranked = rank("import", &candidates, now);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].item_id, ItemId(1));

    let candidates = vec![doc(2, "cat", now)];
    assert!(rank("bat", &candidates, now).is_empty());
}

#[test]
fn scenario_4_acronym_match() {
    let now = 0;
    let candidates = vec![doc(1, "looks good to me", now)];
    let ranked = rank("lgtm", &candidates, now);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].score.intent_tier, 3);
    assert_eq!(ranked[0].score.words_matched_weight, 16);
}

#[test]
fn scenario_5_punctuation_has_weight() {
    let now = 0;
    let candidates = vec![doc(1, "192.168.1.1", now), doc(2, "192 168 1 1", now)];
    let ranked = rank("192.168.1.1", &candidates, now);
    assert_eq!(ranked[0].item_id, ItemId(1));
    assert!(ranked[0].score.words_matched_weight > ranked[1].score.words_matched_weight);
}

#[test]
fn scenario_boundary_query_of_length_zero_is_recency_ordered() {
    let candidates = vec![doc(1, "old", 100), doc(2, "new", 200)];
    let ranked = rank("", &candidates, 300);
    assert_eq!(ranked[0].item_id, ItemId(2));
    assert_eq!(ranked[1].item_id, ItemId(1));
}

#[test]
fn dominance_invariant_words_matched_weight_beats_everything_else() {
    let now = 0;
    // "exactmatch" (one long exact word, weight 100) vs two short fuzzy
    // words with far lower combined weight but a perfect tier/proximity.
    let candidates = vec![doc(1, "zz exactmatch zz", now), doc(2, "ab cd", now)];
    let ranked = rank("exactmatch", &candidates, now);
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].item_id, ItemId(1));
}
