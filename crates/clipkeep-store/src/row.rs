use clipkeep_core::{
    ClipColor, ClipFile, ClipImage, ClipLink, Content, FileEntry, Item, ItemId, LinkMetadataState,
};
use rusqlite::Row;

use crate::schema::{content_kind, link_state};

/// Splits an `Item` into the flat column values `INSERT`/`UPDATE` bind.
pub struct ContentColumns {
    pub kind: i64,
    pub text_value: Option<String>,
    pub image_bytes: Option<Vec<u8>>,
    pub thumbnail_bytes: Option<Vec<u8>>,
    pub image_description: Option<String>,
    pub link_url: Option<String>,
    pub link_state: Option<i64>,
    pub link_title: Option<String>,
    pub link_description: Option<String>,
    pub link_image_bytes: Option<Vec<u8>>,
    pub color_rgba: Option<i64>,
    pub color_raw_text: Option<String>,
    pub file_entries_json: Option<String>,
}

pub fn split_content(content: &Content) -> ContentColumns {
    let mut c = ContentColumns {
        kind: 0,
        text_value: None,
        image_bytes: None,
        thumbnail_bytes: None,
        image_description: None,
        link_url: None,
        link_state: None,
        link_title: None,
        link_description: None,
        link_image_bytes: None,
        color_rgba: None,
        color_raw_text: None,
        file_entries_json: None,
    };
    match content {
        Content::Text { value } => {
            c.kind = content_kind::TEXT;
            c.text_value = Some(value.clone());
        }
        Content::Image(ClipImage {
            bytes,
            thumbnail_bytes,
            description,
        }) => {
            c.kind = content_kind::IMAGE;
            c.image_bytes = Some(bytes.clone());
            c.thumbnail_bytes = Some(thumbnail_bytes.clone());
            c.image_description = Some(description.clone());
        }
        Content::Link(ClipLink { url, metadata_state }) => {
            c.kind = content_kind::LINK;
            c.link_url = Some(url.clone());
            match metadata_state {
                LinkMetadataState::Pending => {
                    c.link_state = Some(link_state::PENDING);
                }
                LinkMetadataState::Loaded {
                    title,
                    description,
                    image_bytes,
                } => {
                    c.link_state = Some(link_state::LOADED);
                    c.link_title = Some(title.clone());
                    c.link_description = Some(description.clone());
                    c.link_image_bytes = image_bytes.clone();
                }
                LinkMetadataState::Failed => {
                    c.link_state = Some(link_state::FAILED);
                }
            }
        }
        Content::Color(ClipColor { rgba, raw_text }) => {
            c.kind = content_kind::COLOR;
            c.color_rgba = Some(*rgba as i64);
            c.color_raw_text = Some(raw_text.clone());
        }
        Content::File(ClipFile { paths }) => {
            c.kind = content_kind::FILE;
            c.file_entries_json = Some(serde_json::to_string(paths).expect("FileEntry serializes"));
        }
    }
    c
}

/// Reassembles an `Item` from a `SELECT * FROM items` row. Column order must
/// match `schema::apply_schema`'s `CREATE TABLE` declaration.
pub fn item_from_row(row: &Row) -> rusqlite::Result<Item> {
    let item_id: i64 = row.get("item_id")?;
    let content_hash: Vec<u8> = row.get("content_hash")?;
    let timestamp: i64 = row.get("timestamp")?;
    let source_app_name: Option<String> = row.get("source_app_name")?;
    let source_app_id: Option<String> = row.get("source_app_id")?;
    let kind: i64 = row.get("content_kind")?;

    let content = match kind {
        k if k == content_kind::TEXT => Content::Text {
            value: row.get("text_value")?,
        },
        k if k == content_kind::IMAGE => Content::Image(ClipImage {
            bytes: row.get("image_bytes")?,
            thumbnail_bytes: row.get("thumbnail_bytes")?,
            description: row.get::<_, Option<String>>("image_description")?.unwrap_or_default(),
        }),
        k if k == content_kind::LINK => {
            let state: i64 = row.get("link_state")?;
            let url: String = row.get("link_url")?;
            let metadata_state = match state {
                s if s == link_state::PENDING => LinkMetadataState::Pending,
                s if s == link_state::LOADED => LinkMetadataState::Loaded {
                    title: row.get::<_, Option<String>>("link_title")?.unwrap_or_default(),
                    description: row
                        .get::<_, Option<String>>("link_description")?
                        .unwrap_or_default(),
                    image_bytes: row.get("link_image_bytes")?,
                },
                _ => LinkMetadataState::Failed,
            };
            Content::Link(ClipLink { url, metadata_state })
        }
        k if k == content_kind::COLOR => Content::Color(ClipColor {
            rgba: row.get::<_, i64>("color_rgba")? as u32,
            raw_text: row.get("color_raw_text")?,
        }),
        _ => {
            let json: String = row.get("file_entries_json")?;
            let paths: Vec<FileEntry> = serde_json::from_str(&json).unwrap_or_default();
            Content::File(ClipFile { paths })
        }
    };

    Ok(Item {
        item_id: ItemId(item_id as u64),
        content_hash: clipkeep_core::ContentHash({
            let mut buf = [0u8; 16];
            let n = content_hash.len().min(16);
            buf[..n].copy_from_slice(&content_hash[..n]);
            buf
        }),
        timestamp,
        source_app_name,
        source_app_id,
        content,
    })
}
