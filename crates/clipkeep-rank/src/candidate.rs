use clipkeep_core::ItemId;

/// A recalled candidate handed to the ranker: a hydrated-enough projection
/// of an `Item` plus its advisory BM25 score (§4.C: "BM25 is advisory
/// only"). The ranker never touches blobs; only `searchable_text`,
/// `timestamp`, and `bm25_score` feed `BucketScore`.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateDoc {
    pub item_id: ItemId,
    pub searchable_text: String,
    pub timestamp: i64,
    /// 0.0 for candidates recalled outside Tantivy (substring scans).
    pub bm25_score: f32,
}
