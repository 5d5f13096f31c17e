use serde::{Deserialize, Serialize};

use crate::content::Content;

/// Monotonically increasing primary key. Never reused, per §3.1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl From<u64> for ItemId {
    fn from(v: u64) -> Self {
        ItemId(v)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable 16-byte fingerprint of normalized content, used for deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 16]);

impl ContentHash {
    pub fn from_sha256(full: &[u8; 32]) -> Self {
        let mut out = [0u8; 16];
        out.copy_from_slice(&full[..16]);
        ContentHash(out)
    }
}

/// Unix milliseconds. Last-use time: insertion time, or bumped to now on re-paste.
pub type Timestamp = i64;

/// The atomic unit of clipboard history (§3.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub item_id: ItemId,
    pub content_hash: ContentHash,
    pub timestamp: Timestamp,
    pub source_app_name: Option<String>,
    pub source_app_id: Option<String>,
    pub content: Content,
}

impl Item {
    /// Derived at write time; the only field the index sees (§3.1).
    pub fn searchable_text(&self) -> String {
        self.content.searchable_text()
    }
}
