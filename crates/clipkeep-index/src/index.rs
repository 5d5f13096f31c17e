use std::path::Path;
use std::sync::RwLock;

use clipkeep_error::{Error, Result};
use tantivy::collector::TopDocs;
use tantivy::directory::MmapDirectory;
use tantivy::tokenizer::{LowerCaser, NgramTokenizer, TextAnalyzer};
use tantivy::{Index as TantivyIndex, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};

use crate::position_filter::IncrementPositionFilter;
use crate::query_builder::build_recall_query;
use crate::schema::{build_schema, ClipFields, TRIGRAM_TOKENIZER};

/// A candidate surfaced by Phase-1 recall: an item id plus an advisory BM25
/// score (§4.C: "BM25 is advisory only"; it becomes field 6 of `BucketScore`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub item_id: u64,
    pub bm25_score: f32,
}

/// The trigram full-text index of §4.C, backed by `tantivy`.
pub struct TrigramIndex {
    index: TantivyIndex,
    writer: RwLock<IndexWriter>,
    reader: RwLock<IndexReader>,
    fields: ClipFields,
}

impl TrigramIndex {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| Error::Storage(e.to_string()))?;
        let dir = MmapDirectory::open(path)?;
        let (schema, fields) = build_schema();
        let index = TantivyIndex::open_or_create(dir, schema)?;
        Self::from_index(index, fields)
    }

    pub fn open_in_memory() -> Result<Self> {
        let (schema, fields) = build_schema();
        let index = TantivyIndex::create_in_ram(schema);
        Self::from_index(index, fields)
    }

    fn from_index(index: TantivyIndex, fields: ClipFields) -> Result<Self> {
        register_tokenizer(&index);
        let writer = index.writer(50_000_000)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;
        Ok(Self {
            index,
            writer: RwLock::new(writer),
            reader: RwLock::new(reader),
            fields,
        })
    }

    /// Idempotent upsert (§4.C `build`): delete-then-add under the same id.
    pub fn build(&self, item_id: u64, searchable_text: &str) -> Result<()> {
        let writer = self.writer.read().expect("writer lock poisoned");
        writer.delete_term(Term::from_field_u64(self.fields.id, item_id));

        let mut doc = TantivyDocument::default();
        doc.add_u64(self.fields.id, item_id);
        doc.add_text(self.fields.content, searchable_text);
        doc.add_text(self.fields.content_words, searchable_text);
        doc.add_i64(self.fields.timestamp, 0);
        writer.add_document(doc)?;
        Ok(())
    }

    /// Same as [`Self::build`] but also records the item's timestamp, used
    /// by the recall-quality tweak in older callers; `clipkeep-store` always
    /// calls this variant so the stored `timestamp` field stays meaningful.
    pub fn build_with_timestamp(&self, item_id: u64, searchable_text: &str, timestamp: i64) -> Result<()> {
        let writer = self.writer.read().expect("writer lock poisoned");
        writer.delete_term(Term::from_field_u64(self.fields.id, item_id));

        let mut doc = TantivyDocument::default();
        doc.add_u64(self.fields.id, item_id);
        doc.add_text(self.fields.content, searchable_text);
        doc.add_text(self.fields.content_words, searchable_text);
        doc.add_i64(self.fields.timestamp, timestamp);
        writer.add_document(doc)?;
        Ok(())
    }

    /// Atomic delete (§4.C `remove`).
    pub fn remove(&self, item_id: u64) -> Result<()> {
        let writer = self.writer.read().expect("writer lock poisoned");
        writer.delete_term(Term::from_field_u64(self.fields.id, item_id));
        Ok(())
    }

    pub fn commit(&self) -> Result<()> {
        self.writer.write().expect("writer lock poisoned").commit()?;
        self.reader.write().expect("reader lock poisoned").reload()?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        {
            let mut writer = self.writer.write().expect("writer lock poisoned");
            writer.delete_all_documents()?;
            writer.commit()?;
        }
        self.reader.write().expect("reader lock poisoned").reload()?;
        Ok(())
    }

    pub fn num_docs(&self) -> u64 {
        self.reader.read().expect("reader lock poisoned").searcher().num_docs()
    }

    /// §4.C `query`: returns candidates whose `searchable_text` contains
    /// every trigram of `q`. Bypassed entirely by callers for queries under
    /// 3 characters (§4.C, §8).
    pub fn query(&self, q: &str, limit: usize) -> Result<Vec<Candidate>> {
        if q.trim().chars().count() < 3 {
            return Ok(Vec::new());
        }
        let reader = self.reader.read().expect("reader lock poisoned");
        let searcher = reader.searcher();
        let recall_query = build_recall_query(&self.index, &self.fields, q);

        let top_docs = searcher.search(recall_query.as_ref(), &TopDocs::with_limit(limit))?;
        let mut out = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher.doc(addr)?;
            let item_id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            out.push(Candidate {
                item_id,
                bm25_score: score,
            });
        }
        Ok(out)
    }

    /// §4.C `rebuild_from_primary`: full reindex after bulk delete/pruning,
    /// or after the startup consistency scan (§SPEC_FULL) finds drift.
    pub fn rebuild_from_primary<I>(&self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = (u64, String, i64)>,
    {
        self.clear()?;
        for (item_id, text, timestamp) in rows {
            self.build_with_timestamp(item_id, &text, timestamp)?;
        }
        self.commit()
    }
}

fn register_tokenizer(index: &TantivyIndex) {
    let tokenizer = TextAnalyzer::builder(NgramTokenizer::new(3, 3, false).expect("valid ngram range"))
        .filter(LowerCaser)
        .filter(IncrementPositionFilter)
        .build();
    index.tokenizers().register(TRIGRAM_TOKENIZER, tokenizer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_idempotent_by_id() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        idx.build_with_timestamp(1, "hello world", 1000).unwrap();
        idx.commit().unwrap();
        assert_eq!(idx.num_docs(), 1);

        idx.build_with_timestamp(1, "updated content", 2000).unwrap();
        idx.commit().unwrap();
        assert_eq!(idx.num_docs(), 1);
    }

    #[test]
    fn remove_deletes_document() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        idx.build_with_timestamp(1, "hello world", 1000).unwrap();
        idx.commit().unwrap();
        idx.remove(1).unwrap();
        idx.commit().unwrap();
        assert_eq!(idx.num_docs(), 0);
    }

    #[test]
    fn clear_empties_the_index() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        for i in 0..5 {
            idx.build_with_timestamp(i, &format!("item {i}"), i as i64).unwrap();
        }
        idx.commit().unwrap();
        assert_eq!(idx.num_docs(), 5);
        idx.clear().unwrap();
        assert_eq!(idx.num_docs(), 0);
    }

    #[test]
    fn query_below_three_chars_returns_empty() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        idx.build_with_timestamp(1, "hello world", 1000).unwrap();
        idx.commit().unwrap();
        assert!(idx.query("hi", 100).unwrap().is_empty());
    }

    #[test]
    fn query_recalls_matching_document() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        idx.build_with_timestamp(1, "hello world foo", 1000).unwrap();
        idx.build_with_timestamp(2, "completely unrelated text", 1000).unwrap();
        idx.commit().unwrap();
        let candidates = idx.query("hello world", 100).unwrap();
        assert!(candidates.iter().any(|c| c.item_id == 1));
        assert!(!candidates.iter().any(|c| c.item_id == 2));
    }

    #[test]
    fn rebuild_from_primary_replaces_all_documents() {
        let idx = TrigramIndex::open_in_memory().unwrap();
        idx.build_with_timestamp(1, "stale entry", 1000).unwrap();
        idx.commit().unwrap();

        idx.rebuild_from_primary(vec![(2u64, "fresh entry".to_string(), 2000i64)])
            .unwrap();
        assert_eq!(idx.num_docs(), 1);
        let candidates = idx.query("fresh entry", 10).unwrap();
        assert!(candidates.iter().any(|c| c.item_id == 2));
    }
}
