//! §4.C — a durable trigram full-text index over `searchable_text`.
//!
//! Grounded on `other_examples`' two `jul-sh-clipkitty` Tantivy indexers:
//! the simpler `rust-core/src/indexer.rs` for the base schema/tokenizer/
//! upsert contract, and `purr/src/indexer.rs` for the `IncrementPositionFilter`
//! and two-phase (recall vs. rank) split that this crate's module boundary
//! with `clipkeep-rank` formalizes.

mod index;
mod position_filter;
mod query_builder;
mod schema;

pub use index::{Candidate, TrigramIndex};
pub use query_builder::max_edit_distance;
