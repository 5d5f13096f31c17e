//! §4.G.1 — query preparation: tokenize `q` into `Qw`/`Qp`/`Qmark`, flag the
//! last mark token as prefix-eligible.

use clipkeep_core::{PreparedQuery, QueryToken, QueryTokenKind};

use crate::tokenizer::{tokenize, TokenKind};

/// §8 boundary: queries with more than 32 words are truncated to 32 for
/// scoring, though the full lowered string still participates in substring
/// tests via `full_lowered`.
pub const MAX_SCORED_WORDS: usize = 32;

pub fn prepare_query(q: &str) -> PreparedQuery {
    let full_lowered: String = q.chars().flat_map(|c| c.to_lowercase()).collect();

    let mut marks: Vec<QueryToken> = Vec::new();
    let mut word_count = 0usize;
    for tok in tokenize(q) {
        let kind = match tok.kind {
            TokenKind::Word => {
                word_count += 1;
                if word_count > MAX_SCORED_WORDS {
                    continue;
                }
                QueryTokenKind::Word
            }
            TokenKind::Punct => QueryTokenKind::Punct,
            TokenKind::Space => continue,
        };
        marks.push(QueryToken {
            kind,
            lowered: tok.lowered,
            allow_prefix: false,
        });
    }

    if let Some(last) = marks.last_mut() {
        last.allow_prefix = true;
    }

    let words = marks
        .iter()
        .filter(|t| t.kind == QueryTokenKind::Word)
        .cloned()
        .collect();
    let puncts = marks
        .iter()
        .filter(|t| t.kind == QueryTokenKind::Punct)
        .cloned()
        .collect();

    PreparedQuery {
        words,
        puncts,
        marks,
        full_lowered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_token_allows_prefix() {
        let pq = prepare_query("hello wo");
        assert!(!pq.marks[0].allow_prefix);
        assert!(pq.marks.last().unwrap().allow_prefix);
    }

    #[test]
    fn splits_words_and_punct() {
        let pq = prepare_query("192.168.1.1");
        assert_eq!(pq.words.len(), 4);
        assert_eq!(pq.puncts.len(), 3);
    }

    #[test]
    fn truncates_scoring_words_past_32_but_keeps_full_lowered() {
        let q = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let pq = prepare_query(&q);
        assert_eq!(pq.words.len(), MAX_SCORED_WORDS);
        assert!(pq.full_lowered.contains("w39"));
    }
}
