//! The primary store (§4.D): a durable ordered map `item_id -> Item`,
//! backed by SQLite with a connection pool shared across readers and a
//! single writer at a time per `rusqlite`'s own serialization.

mod row;
mod schema;
mod store;

pub use row::ContentColumns;
pub use schema::{content_kind, link_state};
pub use store::PrimaryStore;
