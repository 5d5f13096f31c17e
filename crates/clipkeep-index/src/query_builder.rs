//! Phase-1 recall query construction (§4.C contract + §SPEC_FULL supplements).
//!
//! Final ranking is entirely owned by `clipkeep-rank`'s bucket score; every
//! choice made here only affects which documents are *recalled* into the
//! (up to 2 000, §4.G.4) candidate set, never their relative order.

use std::collections::HashSet;

use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::IndexRecordOption;
use tantivy::{Index, Term};

use crate::schema::{ClipFields, TRIGRAM_TOKENIZER};

fn trigram_terms(index: &Index, content_field: tantivy::schema::Field, text: &str) -> Vec<Term> {
    let mut tokenizer = index.tokenizers().get(TRIGRAM_TOKENIZER).unwrap();
    let mut stream = tokenizer.token_stream(text);
    let mut terms = Vec::new();
    while let Some(token) = stream.next() {
        terms.push(Term::from_field_text(content_field, &token.text));
    }
    terms
}

/// Trigrams contributed by adjacent-character-swap variants of short (3-4
/// char) query words, to recall documents containing the un-swapped typo
/// the user actually made (§SPEC_FULL "Transposition-variant trigrams").
fn transposition_trigrams(
    index: &Index,
    content_field: tantivy::schema::Field,
    words: &[&str],
    seen: &mut HashSet<Term>,
) -> Vec<Term> {
    let mut extra = Vec::new();
    for word in words {
        let len = word.chars().count();
        if !(3..=4).contains(&len) {
            continue;
        }
        let chars: Vec<char> = word.chars().collect();
        for i in 0..chars.len() - 1 {
            let mut v = chars.clone();
            v.swap(i, i + 1);
            let variant: String = v.into_iter().collect();
            if variant == *word {
                continue;
            }
            for term in trigram_terms(index, content_field, &variant) {
                if seen.insert(term.clone()) {
                    extra.push(term);
                }
            }
        }
    }
    extra
}

/// `3..=8 chars -> 1`, `>8 -> 2`, matching the fuzzy ceiling of §4.B's
/// per-word cascade, so Phase-1 fuzzy recall doesn't admit matches Phase 2
/// would reject anyway.
pub fn max_edit_distance(len: usize) -> u8 {
    if len <= 2 {
        0
    } else if len <= 8 {
        1
    } else {
        2
    }
}

fn fuzzy_word_clauses(index: &Index, fields: &ClipFields, query: &str) -> Vec<(Occur, Box<dyn Query>)> {
    let words: Vec<&str> = query.split_whitespace().collect();
    if words.len() >= 4 {
        return Vec::new();
    }
    let last_word_is_prefix = query.ends_with(|c: char| c.is_alphanumeric());

    let mut clauses = Vec::new();
    for (i, word) in words.iter().enumerate() {
        let len = word.chars().count();
        if len < 3 {
            continue;
        }
        let distance = max_edit_distance(len);
        if distance == 0 {
            continue;
        }
        let term = Term::from_field_text(fields.content_words, &word.to_lowercase());
        let is_last = i == words.len() - 1;
        let q: Box<dyn Query> = if is_last && last_word_is_prefix {
            Box::new(FuzzyTermQuery::new_prefix(term, distance, true))
        } else {
            Box::new(FuzzyTermQuery::new(term, distance, true))
        };
        let _ = index; // fields already scoped to this index's schema
        clauses.push((Occur::Should, q));
    }
    clauses
}

fn phrase_boost(index: &Index, fields: &ClipFields, text: &str, boost: f32) -> Option<(Occur, Box<dyn Query>)> {
    let terms = trigram_terms(index, fields.content, text);
    if terms.len() < 2 {
        return None;
    }
    let phrase = PhraseQuery::new(terms);
    Some((Occur::Should, Box::new(BoostQuery::new(Box::new(phrase), boost))))
}

/// Builds the Phase-1 recall query: an OR of trigram terms (with a
/// length-scaled `minimum_number_should_match`), widened by transposition
/// variants and fuzzy-word clauses, boosted by per-word/word-pair/full-query
/// phrase contiguity (§SPEC_FULL "Phrase-boost recall tiers").
pub fn build_recall_query(index: &Index, fields: &ClipFields, query: &str) -> Box<dyn Query> {
    let words: Vec<&str> = query.split_whitespace().collect();
    let is_long_query = words.len() >= 4;

    let mut seen: HashSet<Term> = HashSet::new();
    let mut terms: Vec<Term> = Vec::new();
    if is_long_query {
        for word in &words {
            for term in trigram_terms(index, fields.content, word) {
                if seen.insert(term.clone()) {
                    terms.push(term);
                }
            }
        }
    } else {
        for term in trigram_terms(index, fields.content, query) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }
    terms.extend(transposition_trigrams(index, fields.content, &words, &mut seen));

    let num_terms = terms.len();
    let trigram_subqueries: Vec<(Occur, Box<dyn Query>)> = terms
        .into_iter()
        .map(|term| {
            let q: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
            (Occur::Should, q)
        })
        .collect();
    let mut recall_query = BooleanQuery::new(trigram_subqueries);

    if num_terms >= 7 {
        let ratio = if num_terms >= 20 {
            4 * num_terms / 5
        } else {
            num_terms * 2 / 3
        };
        recall_query.set_minimum_number_should_match(ratio.max(5));
    }

    let mut should_clauses: Vec<(Occur, Box<dyn Query>)> = vec![(Occur::Must, Box::new(recall_query))];
    should_clauses.extend(fuzzy_word_clauses(index, fields, query));

    for word in &words {
        if word.len() >= 3 {
            if let Some(boost) = phrase_boost(index, fields, word, 2.0) {
                should_clauses.push(boost);
            }
        }
    }
    if !is_long_query {
        for pair in words.windows(2) {
            if pair[0].len() >= 2 && pair[1].len() >= 2 {
                let pair_str = format!("{} {}", pair[0], pair[1]);
                if let Some(boost) = phrase_boost(index, fields, &pair_str, 3.0) {
                    should_clauses.push(boost);
                }
            }
        }
        if words.len() >= 2 {
            if let Some(boost) = phrase_boost(index, fields, query, 5.0) {
                should_clauses.push(boost);
            }
        }
    }

    Box::new(BooleanQuery::new(should_clauses))
}
