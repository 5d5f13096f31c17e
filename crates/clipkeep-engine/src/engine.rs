//! The public façade (§6.1): a single `Engine` handle wiring the primary
//! store, trigram index, ingestion actor, link fetcher, and search
//! coordinator together behind the narrow operation surface the embedding
//! application is meant to use.

use std::sync::Arc;

use clipkeep_core::{Item, ItemId, MatchData};
use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_ingest::{ImageClassifier, IngestDeps, IngestHandle, Pasteboard, RawFileEntry};
use clipkeep_link::LinkFetchHandle;
use clipkeep_store::PrimaryStore;

use crate::config::Config;
use crate::coordinator::{SearchCoordinator, SearchState};
use crate::{consistency, migration, pruner};

const STORE_FILE_NAME: &str = "store.db";
const INDEX_DIR_NAME: &str = "index";

/// §6.1 `search`'s output: the full ordered id+match-data list plus an
/// eagerly hydrated first result (for instant preview) and the total count
/// (for scroll-as-pagination).
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub matches: Vec<MatchData>,
    pub total_count: usize,
    pub first_item: Option<Item>,
}

pub struct Engine {
    store: Arc<PrimaryStore>,
    index: Arc<TrigramIndex>,
    ingest: IngestHandle,
    coordinator: SearchCoordinator,
    config: Config,
}

impl Engine {
    /// §6.1 `open(db_path)` plus §6.2's caller-supplied collaborators. Runs,
    /// in order: the one-shot legacy directory migration (§6.3, §9), store
    /// and index open, the startup self-consistency check (SPEC_FULL
    /// supplement 2), an initial pruning pass (§4.I "triggered on startup"),
    /// and spawns the ingestion actor.
    pub fn open(
        config: Config,
        pasteboard: Arc<dyn Pasteboard>,
        image_classifier: Arc<dyn ImageClassifier>,
    ) -> Result<Self> {
        migration::migrate_if_needed(&config.db_path, config.legacy_db_path.as_deref())?;
        std::fs::create_dir_all(&config.db_path).map_err(|e| clipkeep_error::Error::Storage(e.to_string()))?;

        let store = Arc::new(PrimaryStore::open(&config.db_path.join(STORE_FILE_NAME))?);
        let index = Arc::new(TrigramIndex::open(&config.db_path.join(INDEX_DIR_NAME))?);

        consistency::check_and_repair(&store, &index)?;
        pruner::prune(&store, &index, config.max_bytes, config.keep_ratio)?;

        let link_fetcher = LinkFetchHandle::new(Arc::clone(&store), Arc::clone(&index));
        let ingest_deps = IngestDeps {
            store: Arc::clone(&store),
            index: Arc::clone(&index),
            link_fetcher: link_fetcher.clone(),
            image_classifier,
            classification_thresholds: config.classification_thresholds,
        };
        let ingest = clipkeep_ingest::spawn(ingest_deps, pasteboard, config.poll.clone(), config.privacy.clone());
        let coordinator = SearchCoordinator::new(Arc::clone(&store), Arc::clone(&index), link_fetcher);

        Ok(Self {
            store,
            index,
            ingest,
            coordinator,
            config,
        })
    }

    /// Opens an engine over an in-memory store and index, for tests and for
    /// embedding applications exercising the engine without touching disk.
    pub fn open_in_memory(
        config: Config,
        pasteboard: Arc<dyn Pasteboard>,
        image_classifier: Arc<dyn ImageClassifier>,
    ) -> Result<Self> {
        let store = Arc::new(PrimaryStore::open_in_memory()?);
        let index = Arc::new(TrigramIndex::open_in_memory()?);
        let link_fetcher = LinkFetchHandle::new(Arc::clone(&store), Arc::clone(&index));
        let ingest_deps = IngestDeps {
            store: Arc::clone(&store),
            index: Arc::clone(&index),
            link_fetcher: link_fetcher.clone(),
            image_classifier,
            classification_thresholds: config.classification_thresholds,
        };
        let ingest = clipkeep_ingest::spawn(ingest_deps, pasteboard, config.poll.clone(), config.privacy.clone());
        let coordinator = SearchCoordinator::new(Arc::clone(&store), Arc::clone(&index), link_fetcher);
        Ok(Self {
            store,
            index,
            ingest,
            coordinator,
            config,
        })
    }

    pub async fn save_text(
        &self,
        text: String,
        app_name: Option<String>,
        app_id: Option<String>,
    ) -> Result<ItemId> {
        let id = self.ingest.save_text(text, app_name, app_id).await?;
        self.prune_once_per_session();
        Ok(id)
    }

    pub async fn save_image(
        &self,
        bytes: Vec<u8>,
        app_name: Option<String>,
        app_id: Option<String>,
    ) -> Result<ItemId> {
        let id = self.ingest.save_image(bytes, app_name, app_id).await?;
        self.prune_once_per_session();
        Ok(id)
    }

    pub async fn save_file_list(
        &self,
        paths: Vec<RawFileEntry>,
        app_name: Option<String>,
        app_id: Option<String>,
    ) -> Result<ItemId> {
        let id = self.ingest.save_file_list(paths, app_name, app_id).await?;
        self.prune_once_per_session();
        Ok(id)
    }

    /// §4.I: "triggered on startup and after every insert once per session".
    /// Best-effort: a failed opportunistic prune is logged, never propagated
    /// to the caller of a successful save.
    fn prune_once_per_session(&self) {
        if let Err(e) = pruner::prune(&self.store, &self.index, self.config.max_bytes, self.config.keep_ratio) {
            tracing::warn!(error = %e, "post-insert pruning pass failed");
        }
    }

    pub fn update_image_description(&self, id: ItemId, description: &str) -> Result<()> {
        self.store.update_image_description(id, description)?;
        self.reindex(id)
    }

    pub fn update_link_metadata(
        &self,
        id: ItemId,
        title: &str,
        description: &str,
        image_bytes: Option<&[u8]>,
    ) -> Result<()> {
        self.store.update_link_metadata(id, title, description, image_bytes)?;
        self.reindex(id)
    }

    pub fn update_timestamp(&self, id: ItemId) -> Result<()> {
        self.store.update_timestamp(id, clipkeep_core::now_ms())?;
        Ok(())
    }

    fn reindex(&self, id: ItemId) -> Result<()> {
        if let Some(item) = self.store.get(id)? {
            self.index.build_with_timestamp(id.0, &item.searchable_text(), item.timestamp)?;
            self.index.commit()?;
        }
        Ok(())
    }

    /// §8 boundary: "Deleting a non-existent id is a no-op, not an error."
    pub fn delete_item(&self, id: ItemId) -> Result<()> {
        self.store.delete_item(id)?;
        self.index.remove(id.0)?;
        self.index.commit()
    }

    pub fn clear(&self) -> Result<()> {
        self.store.clear()?;
        self.index.clear()
    }

    pub fn fetch_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        self.store.get_by_ids(ids)
    }

    /// §6.1 `search`. Runs the full §4.H pipeline (debounce + cancellation)
    /// and returns once this call's query has settled.
    ///
    /// `SearchCoordinator` is shared across every concurrent caller (§5:
    /// "Callers invoke the engine from any thread"), so the state read after
    /// `set_query` returns may belong to a *different*, later call that has
    /// already settled by the time this one observes it. The `query` field
    /// carried on `Results`/`ResultsLoading` (§5: "Search results carry their
    /// input query back to the caller so late completions can be filtered")
    /// is checked against this call's own query before treating the state as
    /// this call's own success.
    pub async fn search(&self, query: String) -> Result<SearchResult> {
        self.coordinator.set_query(query.clone()).await;
        match self.coordinator.state().await {
            SearchState::Results { query: settled_query, items, first } if settled_query == query => {
                let first_item = match first {
                    Some(id) => self.store.get(id)?,
                    None => None,
                };
                Ok(SearchResult {
                    total_count: items.len(),
                    matches: items,
                    first_item,
                })
            }
            SearchState::Error { message } => Err(clipkeep_error::Error::Storage(message)),
            // either superseded outright (still `ResultsLoading`/`Idle`), or
            // this call's query already lost the race to a later one that
            // settled first; either way, not this call's own result.
            SearchState::Results { .. } | SearchState::Idle | SearchState::ResultsLoading { .. } => {
                Err(clipkeep_error::Error::Cancelled)
            }
        }
    }

    pub fn fetch_item(&self, id: ItemId) -> Result<Option<Item>> {
        self.coordinator.fetch_item(id)
    }

    pub async fn fetch_link_metadata(&self, url: String, id: ItemId) -> Result<Option<Item>> {
        self.coordinator.fetch_link_metadata(url, id).await
    }

    pub fn prune_to_size(&self, max_bytes: u64, keep_ratio: f64) -> Result<u64> {
        pruner::prune(&self.store, &self.index, max_bytes, keep_ratio)
    }

    pub fn database_size(&self) -> Result<u64> {
        self.store.database_size_bytes()
    }

    /// §6.2 `on_sleep()`/`on_wake()`.
    pub async fn on_sleep(&self) {
        self.ingest.on_sleep().await;
    }

    pub async fn on_wake(&self) {
        self.ingest.on_wake().await;
    }

    pub async fn shutdown(&self) {
        self.ingest.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_ingest::NullPasteboard;
    use clipkeep_ingest::NullImageClassifier;

    fn test_engine() -> Engine {
        let config = Config::new("/tmp/unused-for-in-memory-engine");
        Engine::open_in_memory(config, Arc::new(NullPasteboard), Arc::new(NullImageClassifier)).unwrap()
    }

    #[tokio::test]
    async fn save_then_search_round_trips() {
        let engine = test_engine();
        let id = engine.save_text("hello world".into(), None, None).await.unwrap();
        let result = engine.search("hello world".into()).await.unwrap();
        assert_eq!(result.total_count, 1);
        assert_eq!(result.matches[0].item_id, id);
        assert!(result.first_item.is_some());
    }

    #[tokio::test]
    async fn delete_then_search_yields_nothing() {
        let engine = test_engine();
        let id = engine.save_text("a unique sentence".into(), None, None).await.unwrap();
        engine.delete_item(id).unwrap();
        let result = engine.search("unique sentence".into()).await.unwrap();
        assert_eq!(result.total_count, 0);
    }

    #[tokio::test]
    async fn deleting_a_nonexistent_id_is_a_noop() {
        let engine = test_engine();
        engine.delete_item(ItemId(99999)).unwrap();
    }

    #[tokio::test]
    async fn clear_empties_both_store_and_index() {
        let engine = test_engine();
        engine.save_text("one".into(), None, None).await.unwrap();
        engine.save_text("two".into(), None, None).await.unwrap();
        engine.clear().unwrap();
        assert_eq!(engine.database_size().is_ok(), true);
        let result = engine.search("".into()).await.unwrap();
        assert_eq!(result.total_count, 0);
    }

    #[tokio::test]
    async fn update_image_description_makes_the_image_searchable() {
        let engine = test_engine();
        let id = engine.save_image(tiny_png(), None, None).await.unwrap();
        // Lets the background classifier task (§4.E.1, `NullImageClassifier`
        // here) finish writing its default description first, so this
        // assertion is about the explicit override winning, not a race with it.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        engine.update_image_description(id, "a red square").unwrap();
        let result = engine.search("red square".into()).await.unwrap();
        assert_eq!(result.total_count, 1);
    }

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 30, 30, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }
}
