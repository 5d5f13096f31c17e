//! Shared data types for the clipkeep clipboard-history engine.
//!
//! This crate has no I/O, no async runtime, and no dependency on any
//! particular storage or indexing backend: every other `clipkeep-*` crate
//! depends on it, never the reverse.

mod content;
mod item;
mod match_data;
mod query;

pub use content::{ClipColor, ClipFile, ClipImage, ClipLink, Content, FileEntry, LinkMetadataState};
pub use item::{ContentHash, Item, ItemId, Timestamp};
pub use match_data::{BucketScore, Highlight, IntentTier, MatchData, MatchKind, WordMatch};
pub use query::{PreparedQuery, QueryToken, QueryTokenKind};

/// A point-in-time snapshot used throughout scoring; always unix milliseconds.
pub fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
