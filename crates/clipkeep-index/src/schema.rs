use tantivy::schema::{Field, IndexRecordOption, Schema, TextFieldIndexing, TextOptions, FAST, INDEXED, STORED};

pub const TRIGRAM_TOKENIZER: &str = "clipkeep-trigram";

pub struct ClipFields {
    pub id: Field,
    pub content: Field,
    pub content_words: Field,
    pub timestamp: Field,
}

/// Schema for the trigram index: an `id` field for the primary-key join, a
/// trigram-tokenized `content` field (the only one scored by recall
/// queries), a standard-tokenized `content_words` field used solely for
/// `FuzzyTermQuery` recall (§SPEC_FULL "Fuzzy term recall"), and a `timestamp`
/// fast field for recency-aware collection.
pub fn build_schema() -> (Schema, ClipFields) {
    let mut builder = Schema::builder();
    let id = builder.add_u64_field("id", STORED | FAST | INDEXED);

    let trigram_indexing = TextFieldIndexing::default()
        .set_tokenizer(TRIGRAM_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    let content = builder.add_text_field(
        "content",
        TextOptions::default()
            .set_indexing_options(trigram_indexing)
            .set_stored(),
    );

    let word_indexing = TextFieldIndexing::default()
        .set_tokenizer("default")
        .set_index_option(IndexRecordOption::Basic);
    let content_words =
        builder.add_text_field("content_words", TextOptions::default().set_indexing_options(word_indexing));

    let timestamp = builder.add_i64_field("timestamp", STORED | FAST);

    let schema = builder.build();
    (
        schema,
        ClipFields {
            id,
            content,
            content_words,
            timestamp,
        },
    )
}
