//! §4.H Search Coordinator: cancellation, 50ms debounce, and fallback
//! preservation around the retrieval+ranking pipeline.
//!
//! Grounded on the actor/handle pattern used throughout this workspace, but
//! state-machine shaped rather than message-shaped: `set_query` mutates
//! shared state directly behind a lock instead of routing through a
//! dedicated thread, since retrieval and ranking here are both synchronous,
//! in-process calls (no pasteboard or network I/O on this path).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clipkeep_core::{ItemId, MatchData};
use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_link::LinkFetchHandle;
use clipkeep_rank::{first_item, rank};
use clipkeep_store::PrimaryStore;
use tokio::sync::Mutex;

use crate::retrieval::retrieve_candidates;

const DEBOUNCE: Duration = Duration::from_millis(50);

/// §4.H's state machine. `Idle` is the coordinator's state before the first
/// `set_query` call.
#[derive(Debug, Clone)]
pub enum SearchState {
    Idle,
    ResultsLoading {
        query: String,
        fallback: Vec<MatchData>,
    },
    Results {
        query: String,
        items: Vec<MatchData>,
        first: Option<ItemId>,
    },
    Error {
        message: String,
    },
}

impl SearchState {
    /// The items currently visible to a UI reading this state: the settled
    /// results, or the fallback carried while a newer query loads.
    pub fn visible_items(&self) -> &[MatchData] {
        match self {
            SearchState::Idle | SearchState::Error { .. } => &[],
            SearchState::ResultsLoading { fallback, .. } => fallback,
            SearchState::Results { items, .. } => items,
        }
    }
}

struct Inner {
    store: Arc<PrimaryStore>,
    index: Arc<TrigramIndex>,
    link_fetcher: LinkFetchHandle,
    token: AtomicU64,
    state: Mutex<SearchState>,
}

/// Cheap, `Clone`-able handle to the coordinator's shared state. Every
/// `set_query` call is independently cancellation-safe: only the call that
/// still holds the current token is allowed to publish its result.
#[derive(Clone)]
pub struct SearchCoordinator {
    inner: Arc<Inner>,
}

impl SearchCoordinator {
    pub fn new(store: Arc<PrimaryStore>, index: Arc<TrigramIndex>, link_fetcher: LinkFetchHandle) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                index,
                link_fetcher,
                token: AtomicU64::new(0),
                state: Mutex::new(SearchState::Idle),
            }),
        }
    }

    pub async fn state(&self) -> SearchState {
        self.inner.state.lock().await.clone()
    }

    /// §4.H steps 1-6. Returns once the query has settled into `Results` or
    /// `Error` for this call's token, or returns early (leaving state
    /// untouched beyond the `ResultsLoading` transition) if superseded by a
    /// later `set_query` call.
    pub async fn set_query(&self, query: String) {
        let token = self.inner.token.fetch_add(1, Ordering::SeqCst) + 1;

        let fallback = self.inner.state.lock().await.visible_items().to_vec();
        *self.inner.state.lock().await = SearchState::ResultsLoading {
            query: query.clone(),
            fallback,
        };

        if !query.trim().is_empty() {
            tokio::time::sleep(DEBOUNCE).await;
            if self.inner.token.load(Ordering::SeqCst) != token {
                return; // cancelled by a newer query
            }
        }

        let now = clipkeep_core::now_ms();
        let result = retrieve_and_rank(&self.inner.store, &self.inner.index, &query, now);

        if self.inner.token.load(Ordering::SeqCst) != token {
            return; // stale: a newer query already superseded this one
        }

        let mut state = self.inner.state.lock().await;
        match result {
            Ok(items) => {
                let first = first_item(&items);
                *state = SearchState::Results { query, items, first };
            }
            Err(e) => {
                *state = SearchState::Error { message: e.to_string() };
            }
        }
    }

    /// Fully hydrates one row on demand (§4.H `fetch_item`), blobs included.
    pub fn fetch_item(&self, id: ItemId) -> Result<Option<clipkeep_core::Item>> {
        self.inner.store.get(id)
    }

    /// §4.H `fetch_link_metadata`: delegates to §4.F, returning the
    /// refreshed, persisted item once the fetch completes.
    pub async fn fetch_link_metadata(&self, url: String, id: ItemId) -> Result<Option<clipkeep_core::Item>> {
        self.inner.link_fetcher.fetch_now(id, url).await?;
        self.inner.store.get(id)
    }
}

fn retrieve_and_rank(
    store: &PrimaryStore,
    index: &TrigramIndex,
    query: &str,
    now_ms: i64,
) -> Result<Vec<MatchData>> {
    let candidates = retrieve_candidates(store, index, query)?;
    Ok(rank(query, &candidates, now_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_core::{Content, ContentHash};

    fn test_coordinator() -> SearchCoordinator {
        let store = Arc::new(PrimaryStore::open_in_memory().unwrap());
        let index = Arc::new(TrigramIndex::open_in_memory().unwrap());
        let link_fetcher = LinkFetchHandle::new(Arc::clone(&store), Arc::clone(&index));
        let hash = ContentHash([1u8; 16]);
        store
            .insert_or_bump(hash, 100, None, None, &Content::Text { value: "hello world".into() }, "hello world")
            .unwrap();
        index.build_with_timestamp(1, "hello world", 100).unwrap();
        index.commit().unwrap();
        SearchCoordinator::new(store, index, link_fetcher)
    }

    #[tokio::test(start_paused = true)]
    async fn set_query_settles_into_results_after_debounce() {
        let coord = test_coordinator();
        coord.set_query("hello".into()).await;
        match coord.state().await {
            SearchState::Results { query, items, first } => {
                assert_eq!(query, "hello");
                assert_eq!(items.len(), 1);
                assert!(first.is_some());
            }
            other => panic!("expected Results, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn a_superseded_query_never_publishes_its_results() {
        let coord = test_coordinator();
        let c2 = coord.clone();
        let first = tokio::spawn(async move { c2.set_query("hello".into()).await });
        // Lets `first` claim its token and enter its debounce sleep before
        // this task claims a newer one, so the outcome doesn't depend on how
        // the two later wake-ups happen to interleave.
        tokio::task::yield_now().await;
        coord.set_query("nonexistent term".into()).await;
        first.await.unwrap();

        match coord.state().await {
            SearchState::Results { query, .. } => assert_eq!(query, "nonexistent term"),
            other => panic!("expected Results for the latest query, got {other:?}"),
        }
    }

    #[test]
    fn fetch_item_returns_none_for_missing_id() {
        let coord = test_coordinator();
        assert!(coord.fetch_item(ItemId(9999)).unwrap().is_none());
    }
}
