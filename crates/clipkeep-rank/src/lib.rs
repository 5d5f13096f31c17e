//! The ranker (§4.G): multi-signal bucket-score search ranking over a
//! candidate set surfaced by `clipkeep-index`.
//!
//! Grounded on `other_examples`' `rust-core/src/search.rs` `SearchEngine`:
//! this crate keeps its two-speed split (a full cascade-matching path for
//! queries of >= 3 chars, a recency-primary path for 1-2 char queries) and
//! its "retrieval already filtered candidates, only scoring/highlighting
//! remains" boundary, but replaces its single `u32` blended score with the
//! full seven-field `BucketScore` lexicographic tuple §4.G.2 specifies.

mod candidate;
mod intent;
mod matching;
mod shape;
mod short_query;

pub use candidate::CandidateDoc;

use clipkeep_core::{ItemId, MatchData};
use clipkeep_text::prepare_query;

/// §4.G.4: candidate retrieval is capped at 2 000 ids by the caller
/// (`clipkeep-index`/`clipkeep-store`); this module only ever scores what it
/// is handed.
pub const MAX_CANDIDATES: usize = 2_000;

/// Scores and shapes every candidate in `candidates` against `query`, and
/// returns them sorted descending by `BucketScore` (§4.G.2-4). Candidates
/// that fail to match every query token are silently dropped (§4.G.2 step
/// 5). `now_ms` is the instant recency decay is computed against.
///
/// Queries of 1-2 characters take the reduced short-query path (§8
/// boundary: "bypasses the trigram index and uses a substring scan"); this
/// function assumes the caller already ran that substring scan and is
/// passing its results as `candidates` — it is the scoring/shaping step,
/// not the retrieval step, for both paths.
pub fn rank(query: &str, candidates: &[CandidateDoc], now_ms: i64) -> Vec<MatchData> {
    let trimmed_len = query.trim().chars().count();
    let mut out: Vec<MatchData> = if trimmed_len == 0 {
        // §8 boundary: empty query returns the recency-ordered full list;
        // the caller is expected to have already ordered `candidates` by
        // recency, so this just shapes each one with a neutral score.
        candidates
            .iter()
            .map(|c| short_query::shape_empty_query(c, now_ms))
            .collect()
    } else if trimmed_len < 3 {
        short_query::rank_short_query(query, candidates, now_ms)
    } else {
        let prepared = prepare_query(query);
        candidates
            .iter()
            .filter_map(|c| matching::compute_match(&prepared, c, now_ms))
            .map(|m| shape::shape_result(&prepared, m, now_ms))
            .collect()
    };
    out.sort_by(|a, b| b.score.cmp(&a.score));
    out
}

/// The first (highest-ranked) item of a freshly ranked result set, per the
/// open-question resolution in SPEC_FULL.md: `first_item` is always the
/// global best, never tied to a pre-existing UI selection.
pub fn first_item(ranked: &[MatchData]) -> Option<ItemId> {
    ranked.first().map(|m| m.item_id)
}
