//! §4.F: a deduplicated, bounded-concurrency link-metadata fetcher.
//!
//! One task per `item_id` is ever in flight; a second `spawn_fetch` for the
//! same id while the first is still running is a no-op (§4.F: "requests for
//! the same item_id already in flight are coalesced").

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clipkeep_core::ItemId;
use clipkeep_index::TrigramIndex;
use clipkeep_store::PrimaryStore;
use tokio::sync::Semaphore;

use crate::image::crop_and_resize;
use crate::scrape::scrape;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_CONCURRENT_FETCHES: usize = 8;

struct Inner {
    client: reqwest::Client,
    store: Arc<PrimaryStore>,
    index: Arc<TrigramIndex>,
    semaphore: Arc<Semaphore>,
    in_flight: Mutex<HashSet<u64>>,
}

/// Cloneable entry point `clipkeep-ingest` holds on to; spawning a fetch
/// requires an active tokio runtime (the ingest actor's own current-thread
/// runtime satisfies this).
#[derive(Clone)]
pub struct LinkFetchHandle {
    inner: Arc<Inner>,
}

impl LinkFetchHandle {
    pub fn new(store: Arc<PrimaryStore>, index: Arc<TrigramIndex>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("reqwest client builds with a static configuration");
        Self {
            inner: Arc::new(Inner {
                client,
                store,
                index,
                semaphore: Arc::new(Semaphore::new(MAX_CONCURRENT_FETCHES)),
                in_flight: Mutex::new(HashSet::new()),
            }),
        }
    }

    /// Spawns a fetch for `url`, writing the result back onto `item_id`.
    /// Returns immediately; the caller does not await completion.
    pub fn spawn_fetch(&self, item_id: ItemId, url: String) {
        {
            let mut in_flight = self.inner.in_flight.lock().expect("in_flight mutex poisoned");
            if !in_flight.insert(item_id.0) {
                return;
            }
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = fetch_one(&inner, item_id, &url).await;
            inner.in_flight.lock().expect("in_flight mutex poisoned").remove(&item_id.0);
            if let Err(e) = result {
                tracing::info!(item_id = item_id.0, url = %url, error = %e, "link metadata fetch failed");
                let _ = inner.store.mark_link_failed(item_id);
            }
        });
    }

    /// §4.H `fetch_link_metadata`: an on-demand, awaitable retry of the same
    /// fetch `spawn_fetch` performs in the background, for callers that need
    /// the enriched row back directly (rather than waiting on the
    /// fire-and-forget path). Coalesces with any fetch already in flight for
    /// `item_id` by waiting for the existing one to clear rather than
    /// starting a second request.
    pub async fn fetch_now(&self, item_id: ItemId, url: String) -> clipkeep_error::Result<()> {
        loop {
            let mut in_flight = self.inner.in_flight.lock().expect("in_flight mutex poisoned");
            if in_flight.insert(item_id.0) {
                break;
            }
            drop(in_flight);
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let result = fetch_one(&self.inner, item_id, &url).await;
        self.inner.in_flight.lock().expect("in_flight mutex poisoned").remove(&item_id.0);
        if result.is_err() {
            let _ = self.inner.store.mark_link_failed(item_id);
        }
        result
    }
}

async fn fetch_one(inner: &Inner, item_id: ItemId, url: &str) -> clipkeep_error::Result<()> {
    let _permit = inner
        .semaphore
        .acquire()
        .await
        .map_err(|_| clipkeep_error::Error::Cancelled)?;

    let response = inner
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| clipkeep_error::Error::Network(e.to_string()))?;
    let html = response
        .text()
        .await
        .map_err(|e| clipkeep_error::Error::Network(e.to_string()))?;

    let metadata = scrape(&html, url);

    let image_bytes = match &metadata.image_url {
        Some(image_url) => fetch_and_process_image(inner, image_url).await,
        None => None,
    };

    let title = metadata.title.unwrap_or_default();
    let description = metadata.description.unwrap_or_default();
    inner
        .store
        .update_link_metadata(item_id, &title, &description, image_bytes.as_deref())?;

    if let Some(item) = inner.store.get(item_id)? {
        inner.index.build_with_timestamp(item_id.0, &item.searchable_text(), item.timestamp)?;
        inner.index.commit()?;
    }
    Ok(())
}

async fn fetch_and_process_image(inner: &Inner, image_url: &str) -> Option<Vec<u8>> {
    let bytes = inner
        .client
        .get(image_url)
        .send()
        .await
        .ok()?
        .bytes()
        .await
        .ok()?;
    crop_and_resize(&bytes).ok()
}
