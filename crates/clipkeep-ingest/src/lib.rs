//! The ingestion pipeline (§4.E): pasteboard polling at an adaptive period,
//! content classification, image transcoding, and insertion into the
//! primary store and trigram index.
//!
//! Grounded on `clipkeep-link`'s actor/handle split: a single dedicated
//! thread (§5 "Ingestion worker: single thread") owns the pasteboard and
//! all writes; callers on any other thread only ever touch the cheap,
//! `Clone`-able [`IngestHandle`].

mod actor;
mod classify;
mod config;
mod handle;
mod hash;
mod image_description;
mod pasteboard;
mod pipeline;
mod transcode;

pub use actor::spawn;
pub use classify::{classify, RawContent, RawFileEntry};
pub use config::{ClassificationThresholds, PollConfig, PrivacyFilter};
pub use handle::IngestHandle;
pub use hash::{hash_file_paths, hash_image_pixels, hash_text};
pub use image_description::{ImageClassifier, NullImageClassifier};
pub use pasteboard::{NullPasteboard, Pasteboard, PasteboardDataKind, PasteboardMarker};
pub use pipeline::{ingest, IngestDeps, InsertOutcome};
pub use transcode::{crop_to_aspect_and_resize, transcode, Transcoded};
