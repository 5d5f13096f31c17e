//! §4.G.2 — per-candidate matching: runs the word/punct/acronym match
//! cascade and produces the ordered match set `M` plus enough positional
//! bookkeeping for §4.G.3 (intent tier) and §4.G.5 (highlight shaping).

use clipkeep_core::{MatchKind, PreparedQuery, QueryToken, QueryTokenKind};
use clipkeep_text::edit_distance::{acronym_match, match_word};
use clipkeep_text::tokenizer::{tokenize, Token, TokenKind};

use crate::candidate::CandidateDoc;

/// One resolved match for a single query token (§4.G.2 step 1-3), carrying
/// both the document-order position used for proximity/tier checks and the
/// byte range needed to highlight it later.
#[derive(Debug, Clone)]
pub(crate) struct PositionedMatch {
    pub query_word: String,
    pub kind: MatchKind,
    pub edit_dist: u32,
    pub match_weight: u32,
    /// Index into the unified (word+punct) document token stream of the
    /// match's first token.
    pub doc_pos: usize,
    /// Same stream, last token covered (equal to `doc_pos` except for
    /// multi-word `Acronym` matches).
    pub end_doc_pos: usize,
    /// Index within the word-only subsequence; `None` for punctuation
    /// matches. Used by §4.G.3's "first doc word (position 0)" and
    /// "strictly increasing document position" checks, which are defined
    /// over query *words*, not punctuation.
    pub word_index: Option<usize>,
    pub is_punct: bool,
}

/// A candidate that matched every query token, with enough context
/// (original-text token stream) for the shaping stage to compute
/// highlights, line numbers, and snippets.
pub(crate) struct ScoredCandidate<'a> {
    pub candidate: &'a CandidateDoc,
    /// In query order (§4.G.2 step 4: "the combined ordered set").
    pub matches: Vec<PositionedMatch>,
    /// All non-space tokens of `candidate.searchable_text`, document order,
    /// with byte offsets into the *original* (not lowercased) text.
    pub doc_tokens: Vec<Token>,
    pub doc_lower: String,
}

/// Priority of a match kind within the per-word cascade: higher wins.
/// Exact and Prefix are equally "best" (both distance 0, full weight);
/// Acronym ranks with them for weight purposes but is resolved separately
/// in [`best_word_match`] since it comes from a different search.
fn cascade_rank(kind: MatchKind) -> u8 {
    match kind {
        MatchKind::Exact | MatchKind::Prefix => 3,
        MatchKind::Acronym => 2,
        MatchKind::Fuzzy => 1,
        MatchKind::Subsequence => 0,
    }
}

/// §4.G.2 step 5: drop the candidate unless every query token (`Qmark`)
/// matched at least once. Returns `None` in that case.
pub(crate) fn compute_match<'a>(
    prepared: &PreparedQuery,
    candidate: &'a CandidateDoc,
    _now_ms: i64,
) -> Option<crate::shape::Scored<'a>> {
    let doc_lower = candidate.searchable_text.to_lowercase();
    let doc_tokens: Vec<Token> = tokenize(&candidate.searchable_text)
        .filter(|t| t.kind != TokenKind::Space)
        .collect();

    // Map word-only / punct-only indices back onto the unified token stream.
    let mut word_doc_pos: Vec<usize> = Vec::new();
    let mut punct_doc_pos: Vec<usize> = Vec::new();
    let mut doc_words: Vec<&str> = Vec::new();
    let mut doc_puncts: Vec<&str> = Vec::new();
    for (doc_pos, tok) in doc_tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::Word => {
                word_doc_pos.push(doc_pos);
                doc_words.push(tok.lowered.as_str());
            }
            TokenKind::Punct => {
                punct_doc_pos.push(doc_pos);
                doc_puncts.push(tok.lowered.as_str());
            }
            TokenKind::Space => unreachable!("space tokens filtered above"),
        }
    }

    let mut matches: Vec<PositionedMatch> = Vec::with_capacity(prepared.marks.len());
    for mark in &prepared.marks {
        let found = match mark.kind {
            QueryTokenKind::Word => best_word_match(mark, &doc_words, &word_doc_pos),
            QueryTokenKind::Punct => best_punct_match(mark, &doc_puncts, &punct_doc_pos),
        };
        let m = found?;
        matches.push(m);
    }

    Some(crate::shape::Scored(ScoredCandidate {
        candidate,
        matches,
        doc_tokens,
        doc_lower,
    }))
}

fn best_word_match(mark: &QueryToken, doc_words: &[&str], word_doc_pos: &[usize]) -> Option<PositionedMatch> {
    let qw = mark.lowered.as_str();
    let qw_chars = qw.chars().count();

    let mut best: Option<(MatchKind, u32, usize)> = None;
    for (idx, dw) in doc_words.iter().enumerate() {
        if let Some((kind, dist)) = match_word(qw, dw, mark.allow_prefix) {
            let replace = match &best {
                None => true,
                Some((bk, bd, _)) => {
                    let (new_r, best_r) = (cascade_rank(kind), cascade_rank(*bk));
                    new_r > best_r || (new_r == best_r && dist < *bd)
                }
            };
            if replace {
                best = Some((kind, dist, idx));
                if kind == MatchKind::Exact {
                    break;
                }
            }
        }
    }

    let acronym_idx = if qw_chars >= 3 && qw.chars().all(|c| c.is_alphanumeric()) {
        (0..doc_words.len()).find(|&p| acronym_match(qw, doc_words, p).is_some())
    } else {
        None
    };

    let weight_full = (qw_chars * qw_chars) as u32;
    let weight_half = (weight_full / 2).max(1);

    match best {
        Some((kind @ (MatchKind::Exact | MatchKind::Prefix), dist, idx)) => Some(PositionedMatch {
            query_word: qw.to_string(),
            kind,
            edit_dist: dist,
            match_weight: weight_full,
            doc_pos: word_doc_pos[idx],
            end_doc_pos: word_doc_pos[idx],
            word_index: Some(idx),
            is_punct: false,
        }),
        _ => {
            if let Some(start_idx) = acronym_idx {
                let span = acronym_match(qw, doc_words, start_idx).expect("checked above");
                let end_idx = start_idx + span - 1;
                Some(PositionedMatch {
                    query_word: qw.to_string(),
                    kind: MatchKind::Acronym,
                    edit_dist: 0,
                    match_weight: weight_full,
                    doc_pos: word_doc_pos[start_idx],
                    end_doc_pos: word_doc_pos[end_idx],
                    word_index: Some(start_idx),
                    is_punct: false,
                })
            } else {
                best.map(|(kind, dist, idx)| PositionedMatch {
                    query_word: qw.to_string(),
                    kind,
                    edit_dist: dist,
                    match_weight: weight_half,
                    doc_pos: word_doc_pos[idx],
                    end_doc_pos: word_doc_pos[idx],
                    word_index: Some(idx),
                    is_punct: false,
                })
            }
        }
    }
}

/// §4.B/§4.G.2 step 3: punctuation matches only ever succeed exactly.
fn best_punct_match(mark: &QueryToken, doc_puncts: &[&str], punct_doc_pos: &[usize]) -> Option<PositionedMatch> {
    let qp = mark.lowered.as_str();
    let qp_chars = qp.chars().count().max(1);
    let idx = doc_puncts.iter().position(|dp| *dp == qp)?;
    Some(PositionedMatch {
        query_word: qp.to_string(),
        kind: MatchKind::Exact,
        edit_dist: 0,
        match_weight: (qp_chars * qp_chars) as u32,
        doc_pos: punct_doc_pos[idx],
        end_doc_pos: punct_doc_pos[idx],
        word_index: None,
        is_punct: true,
    })
}

pub(crate) fn cascade_priority(kind: MatchKind) -> u8 {
    match kind {
        MatchKind::Exact => 4,
        MatchKind::Prefix => 3,
        MatchKind::Acronym => 2,
        MatchKind::Fuzzy => 1,
        MatchKind::Subsequence => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_text::prepare_query;

    fn cand(text: &str, ts: i64) -> CandidateDoc {
        CandidateDoc {
            item_id: clipkeep_core::ItemId(1),
            searchable_text: text.to_string(),
            timestamp: ts,
            bm25_score: 0.0,
        }
    }

    #[test]
    fn every_query_token_must_match_or_candidate_is_dropped() {
        let prepared = prepare_query("zzzzz");
        let doc = cand("hello world", 0);
        assert!(compute_match(&prepared, &doc, 0).is_none());
    }

    #[test]
    fn exact_word_match_gets_full_weight() {
        let prepared = prepare_query("hello");
        let doc = cand("hello world", 0);
        let scored = compute_match(&prepared, &doc, 0).unwrap().0;
        assert_eq!(scored.matches.len(), 1);
        assert_eq!(scored.matches[0].kind, MatchKind::Exact);
        assert_eq!(scored.matches[0].match_weight, 25);
    }

    #[test]
    fn punctuation_tokens_contribute_their_own_matches() {
        let prepared = prepare_query("192.168.1.1");
        let doc = cand("192.168.1.1", 0);
        let scored = compute_match(&prepared, &doc, 0).unwrap().0;
        // 4 words + 3 puncts
        assert_eq!(scored.matches.len(), 7);
        assert_eq!(scored.matches.iter().filter(|m| m.is_punct).count(), 3);
    }

    #[test]
    fn acronym_covers_consecutive_doc_words() {
        let prepared = prepare_query("lgtm");
        let doc = cand("looks good to me", 0);
        let scored = compute_match(&prepared, &doc, 0).unwrap().0;
        assert_eq!(scored.matches[0].kind, MatchKind::Acronym);
        assert_eq!(scored.matches[0].word_index, Some(0));
    }
}
