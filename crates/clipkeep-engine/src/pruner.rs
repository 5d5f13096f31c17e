//! §4.I Pruner: the only component permitted to delete items in bulk. Runs
//! on startup and after every insert once per session, or on explicit
//! request from the caller.

use std::sync::Arc;

use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_store::PrimaryStore;

/// §4.I step 3: "delete_count = max(100, ⌈(total_bytes − target_bytes)/avg_size⌉)".
const MIN_DELETE_COUNT: u64 = 100;

/// Runs one pruning pass. Returns the number of items deleted (0 if the
/// store was already within `max_bytes`).
pub fn prune(store: &Arc<PrimaryStore>, index: &Arc<TrigramIndex>, max_bytes: u64, keep_ratio: f64) -> Result<u64> {
    let total_bytes = store.database_size_bytes()?;
    if total_bytes <= max_bytes {
        return Ok(0);
    }

    let n = store.count_items()?;
    if n == 0 {
        return Ok(0);
    }

    let avg_size = total_bytes as f64 / n as f64;
    let target_bytes = max_bytes as f64 * keep_ratio;
    let overage = (total_bytes as f64 - target_bytes).max(0.0);
    let delete_count = (overage / avg_size).ceil() as u64;
    let delete_count = delete_count.max(MIN_DELETE_COUNT).min(n);

    let ids = store.ids_with_smallest_timestamp(delete_count)?;
    let deleted = store.delete_many(&ids)?;
    for id in &ids {
        index.remove(id.0)?;
    }
    index.commit()?;
    store.reclaim_space()?;

    tracing::info!(deleted, total_bytes, max_bytes, "pruned clipboard history to fit byte budget");
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_core::{Content, ContentHash};

    fn seeded_store(n: u32) -> (Arc<PrimaryStore>, Arc<TrigramIndex>) {
        let store = Arc::new(PrimaryStore::open_in_memory().unwrap());
        let index = Arc::new(TrigramIndex::open_in_memory().unwrap());
        for i in 0..n {
            let mut b = [0u8; 16];
            b[..4].copy_from_slice(&i.to_le_bytes());
            let text = format!("item number {i} with some extra padding text to take up space");
            let (id, _) = store
                .insert_or_bump(ContentHash(b), i as i64, None, None, &Content::Text { value: text.clone() }, &text)
                .unwrap();
            index.build_with_timestamp(id.0, &text, i as i64).unwrap();
        }
        index.commit().unwrap();
        (store, index)
    }

    #[test]
    fn a_store_within_budget_is_untouched() {
        let (store, index) = seeded_store(10);
        let size = store.database_size_bytes().unwrap();
        let deleted = prune(&store, &index, size * 2, 0.8).unwrap();
        assert_eq!(deleted, 0);
        assert_eq!(store.count_items().unwrap(), 10);
    }

    #[test]
    fn an_over_budget_store_deletes_the_oldest_rows_first() {
        let (store, index) = seeded_store(500);
        let size = store.database_size_bytes().unwrap();
        let max_bytes = size / 4;
        let deleted = prune(&store, &index, max_bytes, 0.8).unwrap();
        assert!(deleted >= MIN_DELETE_COUNT);

        let remaining = store.recency_scan(10_000).unwrap();
        assert_eq!(remaining.len() as u64, 500 - deleted);
        // the oldest timestamps (0, 1, 2, ...) should be the ones gone
        assert!(remaining.iter().all(|item| item.timestamp >= deleted as i64));
        assert_eq!(index.num_docs(), remaining.len() as u64);
    }

    #[test]
    fn delete_count_is_floored_at_the_minimum_even_for_a_small_overage() {
        let (store, index) = seeded_store(1000);
        let size = store.database_size_bytes().unwrap();
        // max_bytes just below current size: overage is tiny, but the spec
        // floors delete_count at 100 regardless.
        let deleted = prune(&store, &index, size - 1, 0.999).unwrap();
        assert!(deleted >= MIN_DELETE_COUNT);
    }
}
