use rusqlite::Connection;

/// §4.D: a durable ordered map `item_id -> Item` with a unique secondary
/// index on `content_hash` and an ordered secondary index on `timestamp`
/// descending. `content_kind` gets its own index for filter-by-kind queries
/// (§4.D: "Optional secondary index on content-type tag").
pub fn apply_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS items (
            item_id           INTEGER PRIMARY KEY AUTOINCREMENT,
            content_hash      BLOB NOT NULL UNIQUE,
            timestamp         INTEGER NOT NULL,
            source_app_name   TEXT,
            source_app_id     TEXT,
            content_kind      INTEGER NOT NULL,
            searchable_text   TEXT NOT NULL,

            text_value        TEXT,

            image_bytes       BLOB,
            thumbnail_bytes   BLOB,
            image_description TEXT,

            link_url          TEXT,
            link_state        INTEGER,
            link_title        TEXT,
            link_description  TEXT,
            link_image_bytes  BLOB,

            color_rgba        INTEGER,
            color_raw_text    TEXT,

            file_entries_json TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_items_timestamp ON items(timestamp DESC);
        CREATE INDEX IF NOT EXISTS idx_items_kind ON items(content_kind);
        "#,
    )
}

/// Tag values for `content_kind`, stable across schema versions (persisted
/// on disk; do not renumber).
pub mod content_kind {
    pub const TEXT: i64 = 0;
    pub const IMAGE: i64 = 1;
    pub const LINK: i64 = 2;
    pub const COLOR: i64 = 3;
    pub const FILE: i64 = 4;
}

/// Tag values for `link_state`.
pub mod link_state {
    pub const PENDING: i64 = 0;
    pub const LOADED: i64 = 1;
    pub const FAILED: i64 = 2;
}
