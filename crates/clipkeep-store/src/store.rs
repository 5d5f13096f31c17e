use std::path::Path;

use clipkeep_core::{ContentHash, Item, ItemId};
use clipkeep_error::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, OptionalExtension};

use crate::row::{item_from_row, split_content};
use crate::schema::apply_schema;

pub struct PrimaryStore {
    pool: Pool<SqliteConnectionManager>,
}

impl PrimaryStore {
    pub fn open(path: &Path) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::new(manager).map_err(|e| Error::Storage(e.to_string()))?;
        let store = Self { pool };
        store.with_conn(|conn| apply_schema(conn).map_err(Error::from))?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        // A named in-memory DB shared across pooled connections, so
        // multiple readers see the same data (a bare `:memory:` would give
        // each pooled connection its own empty database).
        let manager = SqliteConnectionManager::file("file:clipkeep-mem?mode=memory&cache=shared")
            .with_flags(rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE | rusqlite::OpenFlags::SQLITE_OPEN_CREATE | rusqlite::OpenFlags::SQLITE_OPEN_URI);
        let pool = Pool::builder()
            .max_size(4)
            .build(manager)
            .map_err(|e| Error::Storage(e.to_string()))?;
        let store = Self { pool };
        store.with_conn(|conn| apply_schema(conn).map_err(Error::from))?;
        Ok(store)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&rusqlite::Connection) -> Result<T>) -> Result<T> {
        let conn = self.pool.get().map_err(Error::from)?;
        f(&conn)
    }

    /// Inserts a new item, or — if `content_hash` already exists (§3.1
    /// invariant) — bumps the existing row's timestamp instead. Returns the
    /// item id and whether a new row was inserted.
    ///
    /// Callers for whom building `content`/`searchable_text` ahead of time is
    /// expensive (image transcoding) should use [`Self::bump_if_exists`]
    /// first and only construct `content` — then call [`Self::insert_new`] —
    /// once that returns `None`.
    pub fn insert_or_bump(
        &self,
        content_hash: ContentHash,
        timestamp: i64,
        source_app_name: Option<&str>,
        source_app_id: Option<&str>,
        content: &clipkeep_core::Content,
        searchable_text: &str,
    ) -> Result<(ItemId, bool)> {
        if let Some(existing) = self.bump_if_exists(content_hash, timestamp)? {
            return Ok((existing, false));
        }
        let item_id = self.insert_new(content_hash, timestamp, source_app_name, source_app_id, content, searchable_text)?;
        Ok((item_id, true))
    }

    /// §4.E step 4: if a row with `content_hash` already exists, bumps its
    /// timestamp to `timestamp` and returns its id; otherwise returns `None`
    /// without touching the store. Lets a caller check for a duplicate
    /// before doing expensive work (e.g. image transcoding) to build the
    /// `Content` it would otherwise need to pass to [`Self::insert_new`].
    pub fn bump_if_exists(&self, content_hash: ContentHash, timestamp: i64) -> Result<Option<ItemId>> {
        self.with_conn(|conn| {
            let existing = conn
                .query_row(
                    "SELECT item_id FROM items WHERE content_hash = ?1",
                    params![content_hash.0.as_slice()],
                    |row| row.get::<_, i64>(0),
                )
                .optional()
                .map_err(Error::from)?;
            match existing {
                Some(existing) => {
                    conn.execute(
                        "UPDATE items SET timestamp = ?1 WHERE item_id = ?2",
                        params![timestamp, existing],
                    )
                    .map_err(Error::from)?;
                    Ok(Some(ItemId(existing as u64)))
                }
                None => Ok(None),
            }
        })
    }

    /// Inserts a new row unconditionally. Callers must have already
    /// established `content_hash` has no existing row, typically via
    /// [`Self::bump_if_exists`].
    pub fn insert_new(
        &self,
        content_hash: ContentHash,
        timestamp: i64,
        source_app_name: Option<&str>,
        source_app_id: Option<&str>,
        content: &clipkeep_core::Content,
        searchable_text: &str,
    ) -> Result<ItemId> {
        self.with_conn(|conn| {
            let cols = split_content(content);
            conn.execute(
                r#"
                INSERT INTO items (
                    content_hash, timestamp, source_app_name, source_app_id,
                    content_kind, searchable_text, text_value,
                    image_bytes, thumbnail_bytes, image_description,
                    link_url, link_state, link_title, link_description, link_image_bytes,
                    color_rgba, color_raw_text, file_entries_json
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)
                "#,
                params![
                    content_hash.0.as_slice(),
                    timestamp,
                    source_app_name,
                    source_app_id,
                    cols.kind,
                    searchable_text,
                    cols.text_value,
                    cols.image_bytes,
                    cols.thumbnail_bytes,
                    cols.image_description,
                    cols.link_url,
                    cols.link_state,
                    cols.link_title,
                    cols.link_description,
                    cols.link_image_bytes,
                    cols.color_rgba,
                    cols.color_raw_text,
                    cols.file_entries_json,
                ],
            )
            .map_err(Error::from)?;

            Ok(ItemId(conn.last_insert_rowid() as u64))
        })
    }

    pub fn get(&self, item_id: ItemId) -> Result<Option<Item>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM items WHERE item_id = ?1",
                params![item_id.0 as i64],
                item_from_row,
            )
            .optional()
            .map_err(Error::from)
        })
    }

    pub fn get_by_ids(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        self.with_conn(|conn| {
            let mut items = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some(item) = conn
                    .query_row(
                        "SELECT * FROM items WHERE item_id = ?1",
                        params![id.0 as i64],
                        item_from_row,
                    )
                    .optional()
                    .map_err(Error::from)?
                {
                    items.push(item);
                }
            }
            Ok(items)
        })
    }

    pub fn update_timestamp(&self, item_id: ItemId, timestamp: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn
                .execute(
                    "UPDATE items SET timestamp = ?1 WHERE item_id = ?2",
                    params![timestamp, item_id.0 as i64],
                )
                .map_err(Error::from)?;
            Ok(n > 0)
        })
    }

    pub fn update_image_description(&self, item_id: ItemId, description: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn
                .execute(
                    "UPDATE items SET image_description = ?1 WHERE item_id = ?2 AND content_kind = ?3",
                    params![description, item_id.0 as i64, crate::schema::content_kind::IMAGE],
                )
                .map_err(Error::from)?;
            Ok(n > 0)
        })
    }

    pub fn update_link_metadata(
        &self,
        item_id: ItemId,
        title: &str,
        description: &str,
        image_bytes: Option<&[u8]>,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn
                .execute(
                    r#"UPDATE items SET link_state = ?1, link_title = ?2, link_description = ?3,
                       link_image_bytes = ?4 WHERE item_id = ?5 AND content_kind = ?6"#,
                    params![
                        crate::schema::link_state::LOADED,
                        title,
                        description,
                        image_bytes,
                        item_id.0 as i64,
                        crate::schema::content_kind::LINK,
                    ],
                )
                .map_err(Error::from)?;
            Ok(n > 0)
        })
    }

    pub fn mark_link_failed(&self, item_id: ItemId) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn
                .execute(
                    "UPDATE items SET link_state = ?1 WHERE item_id = ?2 AND content_kind = ?3",
                    params![
                        crate::schema::link_state::FAILED,
                        item_id.0 as i64,
                        crate::schema::content_kind::LINK,
                    ],
                )
                .map_err(Error::from)?;
            Ok(n > 0)
        })
    }

    /// §8 boundary: "Deleting a non-existent id is a no-op, not an error."
    pub fn delete_item(&self, item_id: ItemId) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn
                .execute("DELETE FROM items WHERE item_id = ?1", params![item_id.0 as i64])
                .map_err(Error::from)?;
            Ok(n > 0)
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM items", []).map_err(Error::from)?;
            Ok(())
        })
    }

    pub fn count_items(&self) -> Result<u64> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM items", [], |r| r.get::<_, i64>(0))
                .map(|n| n as u64)
                .map_err(Error::from)
        })
    }

    /// §4.D: "Size is reported via an O(1) byte counter (page-count ×
    /// page-size or equivalent)".
    pub fn database_size_bytes(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let page_count: i64 = conn.query_row("PRAGMA page_count", [], |r| r.get(0)).map_err(Error::from)?;
            let page_size: i64 = conn.query_row("PRAGMA page_size", [], |r| r.get(0)).map_err(Error::from)?;
            Ok((page_count * page_size) as u64)
        })
    }

    /// Recency-ordered scan, used both for the empty-query result (§8) and
    /// the substring fallback for 1-2 char queries (§4.C).
    pub fn recency_scan(&self, limit: usize) -> Result<Vec<Item>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM items ORDER BY timestamp DESC LIMIT ?1")
                .map_err(Error::from)?;
            let items = stmt
                .query_map(params![limit as i64], item_from_row)
                .map_err(Error::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::from)?;
            Ok(items)
        })
    }

    /// Recency-ordered substring scan over `searchable_text`, used for
    /// queries of 1-2 characters (§4.C, §8) instead of the trigram index.
    /// Bounded by `scan_cap` rows examined, matching §4.C's "capped
    /// recency-ordered scan".
    pub fn substring_scan(&self, needle_lowered: &str, scan_cap: usize) -> Result<Vec<Item>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT * FROM items ORDER BY timestamp DESC LIMIT ?1")
                .map_err(Error::from)?;
            let items = stmt
                .query_map(params![scan_cap as i64], item_from_row)
                .map_err(Error::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::from)?;
            Ok(items
                .into_iter()
                .filter(|item| item.searchable_text().to_lowercase().contains(needle_lowered))
                .collect())
        })
    }

    /// §4.I step 4: the `delete_count` rows with smallest `timestamp`.
    pub fn ids_with_smallest_timestamp(&self, delete_count: u64) -> Result<Vec<ItemId>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT item_id FROM items ORDER BY timestamp ASC LIMIT ?1")
                .map_err(Error::from)?;
            let ids = stmt
                .query_map(params![delete_count as i64], |r| r.get::<_, i64>(0))
                .map_err(Error::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::from)?
                .into_iter()
                .map(|id| ItemId(id as u64))
                .collect();
            Ok(ids)
        })
    }

    pub fn delete_many(&self, ids: &[ItemId]) -> Result<u64> {
        self.with_conn(|conn| {
            let mut deleted = 0u64;
            for id in ids {
                deleted += conn
                    .execute("DELETE FROM items WHERE item_id = ?1", params![id.0 as i64])
                    .map_err(Error::from)? as u64;
            }
            Ok(deleted)
        })
    }

    pub fn reclaim_space(&self) -> Result<()> {
        self.with_conn(|conn| conn.execute_batch("VACUUM;").map_err(Error::from))
    }

    /// All `(item_id, searchable_text, timestamp)` rows, for
    /// `TrigramIndex::rebuild_from_primary` (§4.C, §7).
    pub fn all_rows_for_rebuild(&self) -> Result<Vec<(u64, String, i64)>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT item_id, searchable_text, timestamp FROM items")
                .map_err(Error::from)?;
            let rows = stmt
                .query_map([], |r| {
                    Ok((r.get::<_, i64>(0)? as u64, r.get::<_, String>(1)?, r.get::<_, i64>(2)?))
                })
                .map_err(Error::from)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(Error::from)?;
            Ok(rows)
        })
    }
}
