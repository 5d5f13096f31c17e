use serde::{Deserialize, Serialize};

use crate::item::{ItemId, Timestamp};

/// How a single query token matched a document token (§4.B "per-word match cascade").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    Exact,
    Prefix,
    Fuzzy,
    Subsequence,
    Acronym,
}

/// One matched (query token, document position) pair, produced during
/// per-candidate scoring (§4.G.2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordMatch {
    pub query_word: String,
    pub doc_word_pos: usize,
    pub kind: MatchKind,
    pub edit_dist: u32,
    pub match_weight: u32,
}

/// §4.G.3's four-tier classification of how literally the query appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IntentTier {
    Tier1 = 1,
    Tier2 = 2,
    Tier3 = 3,
    Tier4 = 4,
}

/// The seven-field lexicographically-compared score defined in §4.G.2.
///
/// Field order is significant: `Ord`/`PartialOrd` are derived in declaration
/// order, and earlier fields must entirely dominate later ones (§8 invariant
/// 3). All fields are oriented so that higher is always better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketScore {
    pub words_matched_weight: u16,
    pub intent_tier: u8,
    pub density_score: u8,
    pub recency_score: u8,
    pub proximity_score: u16,
    pub bm25_quantized: u16,
    pub recency_raw: i64,
}

/// A non-overlapping highlighted byte range within `searchable_text` (§4.G.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub kind: MatchKind,
}

/// Result-shaping output for a single ranked hit (§4.G.5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchData {
    pub item_id: ItemId,
    pub score: BucketScore,
    pub highlights: Vec<Highlight>,
    pub line_number: u32,
    pub densest_highlight_start: u64,
    pub snippet: String,
    pub timestamp: Timestamp,
}
