//! The public entry point into this crate: a cheap, `Clone`able handle that
//! talks to an ingest actor running on its own dedicated thread. Mirrors the
//! actor/handle/builder split used for every other stateful subsystem in
//! this workspace: one thread, one `tokio::runtime::Builder::new_current_thread`
//! runtime, messages in over an `mpsc` channel, replies out over a
//! `oneshot` per request.

use clipkeep_core::ItemId;
use clipkeep_error::{Error, Result};
use tokio::sync::{mpsc, oneshot};

use crate::classify::RawFileEntry;

pub(crate) enum IngestMessage {
    SaveText {
        text: String,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
        reply: oneshot::Sender<Result<ItemId>>,
    },
    SaveImage {
        bytes: Vec<u8>,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
        reply: oneshot::Sender<Result<ItemId>>,
    },
    SaveFileList {
        files: Vec<RawFileEntry>,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
        reply: oneshot::Sender<Result<ItemId>>,
    },
    /// §6.2 `on_sleep()`: suspends the poll loop entirely (§4.E: "System
    /// asleep: suspended entirely") until a matching `Wake`.
    Sleep,
    /// §6.2 `on_wake()`.
    Wake,
    Shutdown,
}

/// Handle to the background ingest actor. Cloning is cheap (an `mpsc`
/// sender clone); every clone can call every method concurrently.
#[derive(Clone, Debug)]
pub struct IngestHandle {
    sender: mpsc::Sender<IngestMessage>,
}

impl IngestHandle {
    pub(crate) fn new(sender: mpsc::Sender<IngestMessage>) -> Self {
        Self { sender }
    }

    /// §6.1 `save_text`. Runs the same classify/hash/dedupe path the
    /// polling loop uses (a typed paste of a URL still becomes a `Link`).
    pub async fn save_text(
        &self,
        text: String,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
    ) -> Result<ItemId> {
        let (reply, rx) = oneshot::channel();
        self.send(IngestMessage::SaveText {
            text,
            source_app_name,
            source_app_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| Error::Cancelled)?
    }

    pub async fn save_image(
        &self,
        bytes: Vec<u8>,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
    ) -> Result<ItemId> {
        let (reply, rx) = oneshot::channel();
        self.send(IngestMessage::SaveImage {
            bytes,
            source_app_name,
            source_app_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| Error::Cancelled)?
    }

    pub async fn save_file_list(
        &self,
        files: Vec<RawFileEntry>,
        source_app_name: Option<String>,
        source_app_id: Option<String>,
    ) -> Result<ItemId> {
        let (reply, rx) = oneshot::channel();
        self.send(IngestMessage::SaveFileList {
            files,
            source_app_name,
            source_app_id,
            reply,
        })
        .await?;
        rx.await.map_err(|_| Error::Cancelled)?
    }

    /// Cooperative shutdown: stops the poll loop and lets the dedicated
    /// thread exit after in-flight work drains.
    pub async fn shutdown(&self) {
        let _ = self.sender.send(IngestMessage::Shutdown).await;
    }

    /// §6.2 `on_sleep()`. Best-effort: if the actor has already shut down
    /// this is silently dropped, matching `shutdown`'s posture.
    pub async fn on_sleep(&self) {
        let _ = self.sender.send(IngestMessage::Sleep).await;
    }

    /// §6.2 `on_wake()`.
    pub async fn on_wake(&self) {
        let _ = self.sender.send(IngestMessage::Wake).await;
    }

    async fn send(&self, message: IngestMessage) -> Result<()> {
        self.sender.send(message).await.map_err(|_| Error::Cancelled)
    }
}
