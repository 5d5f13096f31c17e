//! §4.E — the ingestion worker: a single dedicated thread running the
//! pasteboard poll loop at an adaptive period, plus direct `save_*` calls
//! routed in over the same actor so every write (polled or explicit) goes
//! through one serialized path into the primary store and index.
//!
//! Grounded on the actor/handle split already established by
//! `clipkeep-link::LinkFetchHandle` and the design note in §9 ("Closures
//! capturing the store in the pasteboard polling loop ... the loop holds a
//! weak handle or index, never a back-edge"): the loop here owns its
//! `IngestDeps` outright and is the only place that ever touches the
//! pasteboard, so no such back-edge exists to worry about.

use std::sync::Arc;
use std::time::Instant;

use clipkeep_core::now_ms;
use tokio::sync::mpsc;

use crate::classify::classify;
use crate::config::{PollConfig, PrivacyFilter};
use crate::handle::{IngestHandle, IngestMessage};
use crate::pasteboard::{Pasteboard, PasteboardMarker};
use crate::pipeline::{ingest, IngestDeps};

const MESSAGE_CHANNEL_CAPACITY: usize = 256;

/// Spawns the ingestion actor on its own OS thread with a dedicated
/// current-thread tokio runtime (§5: "single thread. Runs the poll loop and
/// performs image transcoding ... and writes"), returning a cheap,
/// `Clone`-able handle. The thread exits once every `IngestHandle` clone is
/// dropped or `shutdown()` is called.
pub fn spawn(
    deps: IngestDeps,
    pasteboard: Arc<dyn Pasteboard>,
    poll_config: PollConfig,
    privacy: PrivacyFilter,
) -> IngestHandle {
    let (tx, rx) = mpsc::channel(MESSAGE_CHANNEL_CAPACITY);
    std::thread::Builder::new()
        .name("clipkeep-ingest".into())
        .spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("current-thread runtime builds with default settings");
            runtime.block_on(run(deps, pasteboard, poll_config, privacy, rx));
        })
        .expect("ingestion thread spawns");
    IngestHandle::new(tx)
}

async fn run(
    deps: IngestDeps,
    pasteboard: Arc<dyn Pasteboard>,
    poll_config: PollConfig,
    privacy: PrivacyFilter,
    mut receiver: mpsc::Receiver<IngestMessage>,
) {
    let mut last_change_count = pasteboard.change_count();
    let mut last_activity = Instant::now();
    let mut asleep = false;

    loop {
        let interval = poll_config.interval_for(last_activity.elapsed());

        tokio::select! {
            biased;

            msg = receiver.recv() => {
                match msg {
                    None | Some(IngestMessage::Shutdown) => {
                        tracing::debug!("ingestion actor shutting down");
                        return;
                    }
                    Some(IngestMessage::Sleep) => {
                        tracing::debug!("ingestion actor suspended for system sleep");
                        asleep = true;
                    }
                    Some(IngestMessage::Wake) => {
                        tracing::debug!("ingestion actor resumed after system wake");
                        asleep = false;
                        last_activity = Instant::now();
                    }
                    Some(direct) => handle_direct_message(&deps, direct),
                }
            }

            _ = tokio::time::sleep(interval), if !asleep => {
                match poll_once(&deps, pasteboard.as_ref(), &privacy, &mut last_change_count) {
                    Ok(changed) => {
                        if changed {
                            last_activity = Instant::now();
                        }
                    }
                    // §7: "The ingestion loop never panics the process on a
                    // single-item failure; it logs and continues."
                    Err(e) => tracing::warn!(error = %e, "ingestion tick failed, continuing"),
                }
            }
        }
    }
}

fn handle_direct_message(deps: &IngestDeps, message: IngestMessage) {
    let timestamp = now_ms();
    match message {
        IngestMessage::SaveText {
            text,
            source_app_name,
            source_app_id,
            reply,
        } => {
            let result = ingest(
                deps,
                crate::classify::RawContent::Text(text),
                source_app_name,
                source_app_id,
                timestamp,
            )
            .map(|o| o.item_id);
            let _ = reply.send(result);
        }
        IngestMessage::SaveImage {
            bytes,
            source_app_name,
            source_app_id,
            reply,
        } => {
            let result = ingest(
                deps,
                crate::classify::RawContent::Image { bytes },
                source_app_name,
                source_app_id,
                timestamp,
            )
            .map(|o| o.item_id);
            let _ = reply.send(result);
        }
        IngestMessage::SaveFileList {
            files,
            source_app_name,
            source_app_id,
            reply,
        } => {
            let result = ingest(
                deps,
                crate::classify::RawContent::Files(files),
                source_app_name,
                source_app_id,
                timestamp,
            )
            .map(|o| o.item_id);
            let _ = reply.send(result);
        }
        IngestMessage::Sleep | IngestMessage::Wake | IngestMessage::Shutdown => {
            unreachable!("handled by the caller before dispatching here")
        }
    }
}

/// One pasteboard tick (§4.E steps 1-6). Returns whether the pasteboard's
/// change counter advanced (used to reset the idle clock regardless of
/// whether the change was actually recordable).
fn poll_once(
    deps: &IngestDeps,
    pasteboard: &dyn Pasteboard,
    privacy: &PrivacyFilter,
    last_change_count: &mut i64,
) -> clipkeep_error::Result<bool> {
    let change_count = pasteboard.change_count();
    if change_count == *last_change_count {
        return Ok(false);
    }
    *last_change_count = change_count;

    if privacy.ignore_concealed && pasteboard.marker_present(PasteboardMarker::Concealed) {
        return Ok(true);
    }
    if privacy.ignore_transient && pasteboard.marker_present(PasteboardMarker::Transient) {
        return Ok(true);
    }

    let (source_app_name, source_app_id) = pasteboard.frontmost_app();
    if privacy.blocks_app(source_app_id.as_deref()) {
        return Ok(true);
    }

    let Some(raw) = classify(pasteboard) else {
        return Ok(true);
    };
    ingest(deps, raw, source_app_name, source_app_id, now_ms())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_description::NullImageClassifier;
    use crate::pasteboard::{NullPasteboard, PasteboardDataKind};
    use clipkeep_index::TrigramIndex;
    use clipkeep_link::LinkFetchHandle;
    use clipkeep_store::PrimaryStore;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn test_deps() -> IngestDeps {
        let store = Arc::new(PrimaryStore::open_in_memory().unwrap());
        let index = Arc::new(TrigramIndex::open_in_memory().unwrap());
        let link_fetcher = LinkFetchHandle::new(Arc::clone(&store), Arc::clone(&index));
        IngestDeps {
            store,
            index,
            link_fetcher,
            image_classifier: Arc::new(NullImageClassifier),
            classification_thresholds: Default::default(),
        }
    }

    struct FixedPasteboard {
        change_count: AtomicI64,
        text: Option<String>,
        concealed: bool,
    }

    impl Pasteboard for FixedPasteboard {
        fn change_count(&self) -> i64 {
            self.change_count.load(Ordering::SeqCst)
        }
        fn data(&self, _kind: PasteboardDataKind) -> Option<Vec<u8>> {
            None
        }
        fn string(&self) -> Option<String> {
            self.text.clone()
        }
        fn marker_present(&self, marker: PasteboardMarker) -> bool {
            self.concealed && marker == PasteboardMarker::Concealed
        }
        fn frontmost_app(&self) -> (Option<String>, Option<String>) {
            (None, None)
        }
    }

    #[test]
    fn unchanged_change_count_is_a_noop() {
        let deps = test_deps();
        let pb = FixedPasteboard {
            change_count: AtomicI64::new(1),
            text: Some("hello".into()),
            concealed: false,
        };
        let mut last = 1;
        let changed = poll_once(&deps, &pb, &PrivacyFilter::default(), &mut last).unwrap();
        assert!(!changed);
        assert_eq!(deps.store.count_items().unwrap(), 0);
    }

    #[test]
    fn changed_pasteboard_ingests_plain_text() {
        let deps = test_deps();
        let pb = FixedPasteboard {
            change_count: AtomicI64::new(2),
            text: Some("hello world".into()),
            concealed: false,
        };
        let mut last = 1;
        let changed = poll_once(&deps, &pb, &PrivacyFilter::default(), &mut last).unwrap();
        assert!(changed);
        assert_eq!(deps.store.count_items().unwrap(), 1);
    }

    #[test]
    fn concealed_marker_is_never_recorded() {
        let deps = test_deps();
        let pb = FixedPasteboard {
            change_count: AtomicI64::new(2),
            text: Some("secret password".into()),
            concealed: true,
        };
        let mut last = 1;
        let changed = poll_once(&deps, &pb, &PrivacyFilter::default(), &mut last).unwrap();
        assert!(changed);
        assert_eq!(deps.store.count_items().unwrap(), 0);
    }

    #[test]
    fn blocked_app_id_is_never_recorded() {
        let deps = test_deps();
        struct BlockedAppPasteboard;
        impl Pasteboard for BlockedAppPasteboard {
            fn change_count(&self) -> i64 {
                2
            }
            fn data(&self, _kind: PasteboardDataKind) -> Option<Vec<u8>> {
                None
            }
            fn string(&self) -> Option<String> {
                Some("whatever".into())
            }
            fn marker_present(&self, _marker: PasteboardMarker) -> bool {
                false
            }
            fn frontmost_app(&self) -> (Option<String>, Option<String>) {
                (Some("Vault".into()), Some("com.example.vault".into()))
            }
        }
        let privacy = PrivacyFilter {
            ignored_app_ids: vec!["com.example.vault".into()],
            ..Default::default()
        };
        let mut last = 1;
        let changed = poll_once(&deps, &BlockedAppPasteboard, &privacy, &mut last).unwrap();
        assert!(changed);
        assert_eq!(deps.store.count_items().unwrap(), 0);
    }

    #[tokio::test]
    async fn spawned_actor_serves_save_text_and_shuts_down() {
        let deps = test_deps();
        let pasteboard: Arc<dyn Pasteboard> = Arc::new(NullPasteboard);
        let handle = spawn(deps, pasteboard, PollConfig::default(), PrivacyFilter::default());
        let id = handle.save_text("saved directly".into(), None, None).await.unwrap();
        assert_eq!(id.0, 1);
        handle.shutdown().await;
    }
}
