//! The public façade crate (§6): wires the primary store, trigram index,
//! ingestion actor, link fetcher, pruner, and search coordinator into the
//! single [`Engine`] handle an embedding application is meant to hold.

mod config;
mod consistency;
mod coordinator;
mod engine;
mod migration;
mod pruner;
mod retrieval;

pub use config::{Config, DEFAULT_KEEP_RATIO, DEFAULT_MAX_BYTES};
pub use coordinator::SearchState;
pub use engine::{Engine, SearchResult};

// Re-exported so callers can construct `Engine::open`'s collaborator
// arguments without depending on `clipkeep-ingest` directly.
pub use clipkeep_ingest::{
    ClassificationThresholds, ImageClassifier, NullImageClassifier, NullPasteboard, Pasteboard,
    PasteboardDataKind, PasteboardMarker, PollConfig, PrivacyFilter, RawFileEntry,
};
