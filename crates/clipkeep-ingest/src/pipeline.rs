//! §4.E steps 2-6: turns a classified pasteboard snapshot into a stored,
//! indexed `Item`, spawning the async follow-up tasks (image description,
//! link metadata) that run off the write path.

use std::sync::Arc;

use clipkeep_core::{
    ClipColor, ClipFile, ClipImage, ClipLink, Content, FileEntry, ItemId, LinkMetadataState,
};
use clipkeep_error::Result;
use clipkeep_index::TrigramIndex;
use clipkeep_link::LinkFetchHandle;
use clipkeep_store::PrimaryStore;

use crate::classify::RawContent;
use crate::config::ClassificationThresholds;
use crate::hash;
use crate::image_description::{spawn_description_task, ImageClassifier};
use crate::transcode::{decode_image, transcode};

#[derive(Clone)]
pub struct IngestDeps {
    pub store: Arc<PrimaryStore>,
    pub index: Arc<TrigramIndex>,
    pub link_fetcher: LinkFetchHandle,
    pub image_classifier: Arc<dyn ImageClassifier>,
    pub classification_thresholds: ClassificationThresholds,
}

pub struct InsertOutcome {
    pub item_id: ItemId,
    pub inserted: bool,
}

/// Runs the full classify-to-index pipeline for one already-classified
/// snapshot. `source_app_name`/`source_app_id` come from the pasteboard's
/// `frontmost_app()` at capture time.
pub fn ingest(
    deps: &IngestDeps,
    raw: RawContent,
    source_app_name: Option<String>,
    source_app_id: Option<String>,
    timestamp: i64,
) -> Result<InsertOutcome> {
    match raw {
        RawContent::Files(files) => {
            let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
            let content_hash = hash::hash_file_paths(&paths);
            let content = Content::File(ClipFile {
                paths: files
                    .into_iter()
                    .map(|f| FileEntry {
                        path: f.path,
                        display_name: f.display_name,
                        byte_size: f.byte_size,
                        bookmark_bytes: f.bookmark_bytes,
                    })
                    .collect(),
            });
            store_and_index(deps, content_hash, content, source_app_name, source_app_id, timestamp)
        }
        RawContent::Image { bytes } => {
            // §4.E steps 3-5: hash the plain decode *before* paying for the
            // downscale/recompress/thumbnail work in `transcode`, so a
            // duplicate paste short-circuits on the dedup check alone.
            let decoded = decode_image(&bytes)?;
            let content_hash = hash::hash_image_pixels(&decoded.to_rgba8().into_raw());

            if let Some(existing) = deps.store.bump_if_exists(content_hash, timestamp)? {
                return Ok(InsertOutcome { item_id: existing, inserted: false });
            }

            let transcoded = transcode(&decoded)?;
            let content = Content::Image(ClipImage {
                bytes: transcoded.bytes,
                thumbnail_bytes: transcoded.thumbnail_bytes,
                description: String::new(),
            });
            let searchable_text = content.searchable_text();
            let item_id = deps.store.insert_new(
                content_hash,
                timestamp,
                source_app_name.as_deref(),
                source_app_id.as_deref(),
                &content,
                &searchable_text,
            )?;
            deps.index.build_with_timestamp(item_id.0, &searchable_text, timestamp)?;
            deps.index.commit()?;

            spawn_description_task(
                Arc::clone(&deps.store),
                Arc::clone(&deps.index),
                Arc::clone(&deps.image_classifier),
                deps.classification_thresholds,
                item_id,
                bytes,
            );
            Ok(InsertOutcome { item_id, inserted: true })
        }
        RawContent::Url(url) => {
            let content_hash = hash::hash_text(&url);
            let content = Content::Link(ClipLink {
                url: url.clone(),
                metadata_state: LinkMetadataState::Pending,
            });
            let outcome =
                store_and_index(deps, content_hash, content, source_app_name, source_app_id, timestamp)?;
            if outcome.inserted {
                deps.link_fetcher.spawn_fetch(outcome.item_id, url);
            }
            Ok(outcome)
        }
        RawContent::Color { rgba, raw_text } => {
            let content_hash = hash::hash_text(&raw_text);
            let content = Content::Color(ClipColor { rgba, raw_text });
            store_and_index(deps, content_hash, content, source_app_name, source_app_id, timestamp)
        }
        RawContent::Text(text) => {
            let content_hash = hash::hash_text(&text);
            let content = Content::Text { value: text };
            store_and_index(deps, content_hash, content, source_app_name, source_app_id, timestamp)
        }
    }
}

fn store_and_index(
    deps: &IngestDeps,
    content_hash: clipkeep_core::ContentHash,
    content: Content,
    source_app_name: Option<String>,
    source_app_id: Option<String>,
    timestamp: i64,
) -> Result<InsertOutcome> {
    let searchable_text = content.searchable_text();
    let (item_id, inserted) = deps.store.insert_or_bump(
        content_hash,
        timestamp,
        source_app_name.as_deref(),
        source_app_id.as_deref(),
        &content,
        &searchable_text,
    )?;
    deps.index.build_with_timestamp(item_id.0, &searchable_text, timestamp)?;
    deps.index.commit()?;
    Ok(InsertOutcome { item_id, inserted })
}
