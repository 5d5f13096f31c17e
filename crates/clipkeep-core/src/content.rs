use serde::{Deserialize, Serialize};

/// One of the five content variants an `Item` can hold (§3.1).
///
/// Destructured exhaustively at every use site per the mapping design note
/// in §9 ("Dynamic content variants ... map to a tagged sum type").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Content {
    Text { value: String },
    Image(ClipImage),
    Link(ClipLink),
    Color(ClipColor),
    File(ClipFile),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipImage {
    /// HEIC/HEVC-encoded full-size bytes (§3.1, §4.E step 5).
    pub bytes: Vec<u8>,
    /// JPEG thumbnail, longest side <= 64px.
    pub thumbnail_bytes: Vec<u8>,
    /// Filled asynchronously by §4.E.1; empty until then.
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipLink {
    pub url: String,
    pub metadata_state: LinkMetadataState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LinkMetadataState {
    Pending,
    Loaded {
        title: String,
        description: String,
        image_bytes: Option<Vec<u8>>,
    },
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipColor {
    /// R<<24 | G<<16 | B<<8 | A, per §3.1.
    pub rgba: u32,
    /// The text the user actually typed/copied, e.g. `"#ff5733"` or `"rgb(255, 87, 51)"`.
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipFile {
    pub paths: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub display_name: String,
    pub byte_size: u64,
    pub bookmark_bytes: Option<Vec<u8>>,
}

impl Content {
    /// §3.1's `searchable_text` derivation. Must be exactly reproducible so a
    /// rebuild from primary rows regenerates it identically (§3.1 invariant).
    pub fn searchable_text(&self) -> String {
        match self {
            Content::Text { value } => value.clone(),
            Content::Image(ClipImage { description, .. }) => description.clone(),
            Content::Link(ClipLink {
                url,
                metadata_state,
            }) => match metadata_state {
                LinkMetadataState::Loaded { title, .. } if !title.is_empty() => {
                    format!("{title} {url}")
                }
                _ => url.clone(),
            },
            Content::Color(ClipColor { raw_text, .. }) => raw_text.clone(),
            Content::File(ClipFile { paths }) => paths
                .iter()
                .map(|e| format!("{} {}", e.display_name, e.path))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}
