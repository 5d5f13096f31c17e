use serde::{Deserialize, Serialize};

/// The kind of a token produced by query preparation (§4.G.1); mirrors the
/// tokenizer's token kinds but drops `Space` since query preparation only
/// cares about `Qw` (word tokens) and `Qp` (punctuation tokens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryTokenKind {
    Word,
    Punct,
}

/// One token of `Qmark = Qw ∪ Qp` in original order (§4.G.1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryToken {
    pub kind: QueryTokenKind,
    pub lowered: String,
    /// True only for the last token of `Qmark` (§4.G.1, §4.B "allow_prefix").
    pub allow_prefix: bool,
}

/// The output of §4.G.1 query preparation, ready for per-candidate scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreparedQuery {
    /// Non-empty word tokens, in original order (`Qw`).
    pub words: Vec<QueryToken>,
    /// Punctuation tokens, in original order (`Qp`).
    pub puncts: Vec<QueryToken>,
    /// `Qw ∪ Qp` in original order (`Qmark`); last element has `allow_prefix`.
    pub marks: Vec<QueryToken>,
    /// The full query, lowercased, used for prefix/substring tests (`Qa`).
    pub full_lowered: String,
}

impl PreparedQuery {
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
