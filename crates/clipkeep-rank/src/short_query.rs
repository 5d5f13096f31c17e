//! The 1-2 character and empty-query paths (§4.C, §8 boundary behaviors).
//!
//! Grounded on `other_examples`' `rust-core/src/search.rs`
//! `score_short_query_batch`: recency is the primary signal, with a boost
//! for prefix matches, rather than the full cascade/bucket-score machinery
//! §4.G.2 defines for queries of 3+ characters (which the trigram index
//! doesn't even see these candidates through in the first place).

use clipkeep_core::{BucketScore, Highlight, MatchData, MatchKind};

use crate::candidate::CandidateDoc;
use crate::shape::recency_score;

fn char_boundary_at_or_before(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn neutral_snippet(text: &str) -> String {
    let end = char_boundary_at_or_before(text, 200);
    text[..end].chars().map(|c| if c == '\n' { ' ' } else { c }).collect()
}

/// §8: "Query of length 0 returns the recency-ordered full list (first N)."
/// Every candidate gets the same word/density/proximity/bm25 fields so that
/// `recency_score`/`recency_raw` alone decide order, preserving whatever
/// recency order the primary store already produced.
pub(crate) fn shape_empty_query(candidate: &CandidateDoc, now_ms: i64) -> MatchData {
    MatchData {
        item_id: candidate.item_id,
        score: BucketScore {
            words_matched_weight: 0,
            intent_tier: 0,
            density_score: 0,
            recency_score: recency_score(now_ms, candidate.timestamp),
            proximity_score: u16::MAX,
            bm25_quantized: 0,
            recency_raw: candidate.timestamp,
        },
        highlights: Vec::new(),
        line_number: 1,
        densest_highlight_start: 0,
        snippet: neutral_snippet(&candidate.searchable_text),
        timestamp: candidate.timestamp,
    }
}

/// §SPEC_FULL supplement 1: candidates have already survived a
/// case-insensitive substring scan (§4.C); this assigns a reduced score —
/// recency primary, intent_tier 4 for a literal prefix match (else 3) —
/// and a single highlight at the first matching byte range.
pub(crate) fn rank_short_query(query: &str, candidates: &[CandidateDoc], now_ms: i64) -> Vec<MatchData> {
    let needle: String = query.trim().chars().flat_map(|c| c.to_lowercase()).collect();
    if needle.is_empty() {
        return candidates.iter().map(|c| shape_empty_query(c, now_ms)).collect();
    }

    candidates
        .iter()
        .filter_map(|c| {
            let doc_lower = c.searchable_text.to_lowercase();
            let pos = doc_lower.find(&needle)?;
            let is_prefix = pos == 0;
            let kind = if is_prefix { MatchKind::Prefix } else { MatchKind::Subsequence };
            let highlight = Highlight {
                start: pos,
                end: pos + needle.len(),
                kind,
            };
            let line = 1 + c.searchable_text.as_bytes()[..pos].iter().filter(|&&b| b == b'\n').count() as u32;
            let snippet = if pos >= 20 || line > 1 {
                crate::shape::build_snippet(&c.searchable_text, &highlight, line)
            } else {
                neutral_snippet(&c.searchable_text)
            };
            let weight = (needle.chars().count() * needle.chars().count()) as u16;
            Some(MatchData {
                item_id: c.item_id,
                score: BucketScore {
                    words_matched_weight: weight,
                    intent_tier: if is_prefix { 4 } else { 3 },
                    density_score: ((needle.chars().count() as f64 / c.searchable_text.chars().count().max(1) as f64)
                        * 255.0)
                        .clamp(0.0, 255.0) as u8,
                    recency_score: recency_score(now_ms, c.timestamp),
                    proximity_score: u16::MAX,
                    bm25_quantized: 0,
                    recency_raw: c.timestamp,
                },
                highlights: vec![highlight],
                line_number: line,
                densest_highlight_start: pos as u64,
                snippet,
                timestamp: c.timestamp,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(text: &str, ts: i64) -> CandidateDoc {
        CandidateDoc {
            item_id: clipkeep_core::ItemId(1),
            searchable_text: text.to_string(),
            timestamp: ts,
            bm25_score: 0.0,
        }
    }

    #[test]
    fn prefix_outranks_mid_string_match_at_equal_recency() {
        let candidates = vec![cand("ab something", 1_000), cand("xx ab", 1_000)];
        let ranked = rank_short_query("ab", &candidates, 2_000);
        let mut sorted = ranked;
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        assert_eq!(sorted[0].item_id, clipkeep_core::ItemId(1));
    }

    #[test]
    fn non_matching_candidates_are_dropped() {
        let candidates = vec![cand("nothing here", 1_000)];
        assert!(rank_short_query("zz", &candidates, 2_000).is_empty());
    }
}
