//! Startup self-consistency check (SPEC_FULL.md supplement): the trigram
//! index is a derived structure, rebuildable at any time from the primary
//! store (§4.C `rebuild_from_primary`, §7). If the two ever disagree on item
//! count — a crash mid-commit, a version skew between the SQLite file and
//! the tantivy segment directory — the index is rebuilt rather than trusted.

use std::sync::Arc;

use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_store::PrimaryStore;

/// Compares `store`'s row count against `index`'s document count and
/// rebuilds the index from the store if they disagree. Returns whether a
/// rebuild happened.
pub fn check_and_repair(store: &Arc<PrimaryStore>, index: &Arc<TrigramIndex>) -> Result<bool> {
    let store_count = store.count_items()?;
    let index_count = index.num_docs();
    if store_count == index_count {
        return Ok(false);
    }

    tracing::warn!(
        store_count,
        index_count,
        "index out of sync with primary store on open, rebuilding"
    );
    let rows = store.all_rows_for_rebuild()?;
    index.rebuild_from_primary(rows)?;
    Ok(true)
}
