//! §4.C/§4.G.4 candidate retrieval: the glue between the store, the
//! trigram index, and the ranker's [`CandidateDoc`] input. One function per
//! query-length regime, mirroring §8's boundary table (empty / 1-2 chars /
//! 3+ chars).

use std::collections::HashMap;

use clipkeep_core::Item;
use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_rank::{CandidateDoc, MAX_CANDIDATES};
use clipkeep_store::PrimaryStore;

/// §4.C: "capped recency-ordered scan" used as the 1-2 char fallback.
const SUBSTRING_SCAN_CAP: usize = 5_000;
/// §8: "Empty query: returns the full recency-ordered list" — capped so a
/// very large history doesn't hydrate unbounded rows for an idle view.
const EMPTY_QUERY_LIMIT: usize = MAX_CANDIDATES;

/// Gathers the candidate set for `query` and hydrates it into the ranker's
/// input type. Does not rank; callers pass the result straight to
/// `clipkeep_rank::rank`.
pub fn retrieve_candidates(
    store: &PrimaryStore,
    index: &TrigramIndex,
    query: &str,
) -> Result<Vec<CandidateDoc>> {
    let trimmed_len = query.trim().chars().count();

    if trimmed_len == 0 {
        let items = store.recency_scan(EMPTY_QUERY_LIMIT)?;
        return Ok(items.iter().map(|item| to_candidate_doc(item, 0.0)).collect());
    }

    if trimmed_len < 3 {
        let needle = query.trim().to_lowercase();
        let items = store.substring_scan(&needle, SUBSTRING_SCAN_CAP)?;
        return Ok(items.iter().map(|item| to_candidate_doc(item, 0.0)).collect());
    }

    let recalled = index.query(query, MAX_CANDIDATES)?;
    if recalled.is_empty() {
        return Ok(Vec::new());
    }
    let scores: HashMap<u64, f32> = recalled.iter().map(|c| (c.item_id, c.bm25_score)).collect();
    let ids: Vec<clipkeep_core::ItemId> = recalled
        .iter()
        .map(|c| clipkeep_core::ItemId(c.item_id))
        .collect();
    let items = store.get_by_ids(&ids)?;
    Ok(items
        .iter()
        .map(|item| {
            let bm25 = scores.get(&item.item_id.0).copied().unwrap_or(0.0);
            to_candidate_doc(item, bm25)
        })
        .collect())
}

fn to_candidate_doc(item: &Item, bm25_score: f32) -> CandidateDoc {
    CandidateDoc {
        item_id: item.item_id,
        searchable_text: item.searchable_text(),
        timestamp: item.timestamp,
        bm25_score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_core::{Content, ContentHash};

    fn insert_text(store: &PrimaryStore, text: &str, ts: i64) -> clipkeep_core::ItemId {
        let mut b = [0u8; 16];
        let bytes = text.as_bytes();
        b[..bytes.len().min(16)].copy_from_slice(&bytes[..bytes.len().min(16)]);
        let (id, _) = store
            .insert_or_bump(ContentHash(b), ts, None, None, &Content::Text { value: text.into() }, text)
            .unwrap();
        id
    }

    #[test]
    fn empty_query_returns_recency_ordered_candidates() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let index = TrigramIndex::open_in_memory().unwrap();
        insert_text(&store, "first one", 100);
        insert_text(&store, "second one", 200);

        let docs = retrieve_candidates(&store, &index, "").unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].timestamp, 200);
    }

    #[test]
    fn short_query_uses_substring_scan_not_the_index() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let index = TrigramIndex::open_in_memory().unwrap();
        insert_text(&store, "ab apples", 100);
        insert_text(&store, "cd bananas", 200);

        let docs = retrieve_candidates(&store, &index, "ab").unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].searchable_text.contains("apples"));
    }

    #[test]
    fn long_query_hydrates_from_index_and_joins_bm25_scores() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let index = TrigramIndex::open_in_memory().unwrap();
        let id = insert_text(&store, "a searchable sentence about rust", 100);
        index
            .build_with_timestamp(id.0, "a searchable sentence about rust", 100)
            .unwrap();
        index.commit().unwrap();
        insert_text(&store, "completely unrelated", 200);

        let docs = retrieve_candidates(&store, &index, "searchable sentence").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].item_id, id);
        assert!(docs[0].bm25_score > 0.0);
    }

    #[test]
    fn long_query_with_no_recall_returns_empty_without_hydrating() {
        let store = PrimaryStore::open_in_memory().unwrap();
        let index = TrigramIndex::open_in_memory().unwrap();
        insert_text(&store, "some text", 100);
        let docs = retrieve_candidates(&store, &index, "nothing like it at all").unwrap();
        assert!(docs.is_empty());
    }
}
