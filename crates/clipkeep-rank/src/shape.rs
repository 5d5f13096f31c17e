//! §4.G.2 (score assembly) and §4.G.5 (result shaping): turns a
//! [`ScoredCandidate`] into the public [`MatchData`] the search coordinator
//! returns to callers.

use clipkeep_core::{BucketScore, Highlight, MatchData, PreparedQuery};

use crate::intent::compute_tier;
use crate::matching::{cascade_priority, PositionedMatch, ScoredCandidate};

/// Thin newtype so `matching` can hand `shape` a `ScoredCandidate` without
/// making the latter's fields part of this crate's public API.
pub(crate) struct Scored<'a>(pub ScoredCandidate<'a>);

const RECENCY_K: f64 = 20.0;
const RECENCY_REF_HOURS: f64 = 400.0;

pub(crate) fn recency_score(now_ms: i64, timestamp: i64) -> u8 {
    let age_hours = ((now_ms - timestamp) as f64 / 3_600_000.0).max(0.0);
    let num = (1.0 + RECENCY_K * age_hours).ln();
    let den = (1.0 + RECENCY_K * RECENCY_REF_HOURS).ln();
    let raw = 255.0 * (1.0 - num / den);
    raw.clamp(0.0, 255.0) as u8
}

fn proximity_score(matches: &[PositionedMatch]) -> u16 {
    if matches.len() <= 1 {
        return u16::MAX;
    }
    let mut total: u64 = 0;
    for pair in matches.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let dist = if b.doc_pos >= a.doc_pos {
            (b.doc_pos - a.doc_pos) as u64
        } else {
            (a.doc_pos - b.doc_pos) as u64 + 5
        };
        total = total.saturating_add(dist);
    }
    u16::MAX.saturating_sub(total.min(u16::MAX as u64) as u16)
}

fn density_score(matches: &[PositionedMatch], doc_char_len: usize) -> u8 {
    if doc_char_len == 0 {
        return 0;
    }
    let matched_chars: usize = matches
        .iter()
        .filter(|m| !m.is_punct)
        .map(|m| m.query_word.chars().count())
        .sum();
    ((matched_chars as f64 / doc_char_len as f64) * 255.0).clamp(0.0, 255.0) as u8
}

/// §4.G.5: merges per-match byte ranges into a flat, non-overlapping
/// sequence. When two ranges overlap, the higher-priority match kind
/// (exact > prefix > acronym > fuzzy > subsequence) labels the merged span.
fn build_highlights(doc_tokens: &[clipkeep_text::tokenizer::Token], matches: &[PositionedMatch]) -> Vec<Highlight> {
    let mut raw: Vec<Highlight> = matches
        .iter()
        .map(|m| Highlight {
            start: doc_tokens[m.doc_pos].start,
            end: doc_tokens[m.end_doc_pos].end,
            kind: m.kind,
        })
        .collect();
    raw.sort_by_key(|h| (h.start, h.end));

    let mut merged: Vec<Highlight> = Vec::with_capacity(raw.len());
    for h in raw {
        if let Some(last) = merged.last_mut() {
            if h.start <= last.end {
                last.end = last.end.max(h.end);
                if cascade_priority(h.kind) > cascade_priority(last.kind) {
                    last.kind = h.kind;
                }
                continue;
            }
        }
        merged.push(h);
    }
    merged
}

fn line_number(text: &str, byte_offset: usize) -> u32 {
    1 + text.as_bytes()[..byte_offset.min(text.len())]
        .iter()
        .filter(|&&b| b == b'\n')
        .count() as u32
}

/// §4.G.5: the highlight whose 120-char neighborhood covers the most
/// highlighted characters, used by the preview pane for auto-scroll.
fn densest_highlight_start(text: &str, highlights: &[Highlight]) -> u64 {
    const WINDOW: usize = 120;
    let Some(first) = highlights.first() else {
        return 0;
    };
    let mut best_start = first.start;
    let mut best_coverage = 0usize;
    for h in highlights {
        let window_end = (h.start + WINDOW).min(text.len());
        let coverage: usize = highlights
            .iter()
            .map(|other| {
                let lo = other.start.max(h.start);
                let hi = other.end.min(window_end);
                hi.saturating_sub(lo)
            })
            .sum();
        if coverage > best_coverage {
            best_coverage = coverage;
            best_start = h.start;
        }
    }
    best_start as u64
}

fn char_boundary_at_or_before(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn char_boundary_at_or_after(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

/// §4.G.5: the row-view text shown in results before a selection is made.
pub(crate) fn build_snippet(text: &str, first: &Highlight, line: u32) -> String {
    if first.start >= 20 || line > 1 {
        let ctx_start = char_boundary_at_or_after(text, first.start.saturating_sub(10));
        let ctx_end = char_boundary_at_or_before(text, first.start + 200);
        let flattened: String = text[ctx_start..ctx_end].chars().map(|c| if c == '\n' { ' ' } else { c }).collect();
        if line > 1 {
            format!("L{line}: {flattened}")
        } else {
            format!("…{flattened}")
        }
    } else {
        let end = char_boundary_at_or_before(text, 200);
        text[..end].chars().map(|c| if c == '\n' { ' ' } else { c }).collect()
    }
}

pub(crate) fn shape_result(prepared: &PreparedQuery, scored: Scored<'_>, now_ms: i64) -> MatchData {
    let ScoredCandidate {
        candidate,
        matches,
        doc_tokens,
        doc_lower,
    } = scored.0;

    let words_matched_weight: u16 = matches
        .iter()
        .map(|m| m.match_weight)
        .fold(0u32, |a, b| a.saturating_add(b))
        .min(u16::MAX as u32) as u16;

    let intent_tier = compute_tier(&prepared.full_lowered, &doc_lower, &matches);
    let density = density_score(&matches, candidate.searchable_text.chars().count());
    let recency = recency_score(now_ms, candidate.timestamp);
    let proximity = proximity_score(&matches);
    let bm25_quantized = ((candidate.bm25_score * 100.0).max(0.0)).min(u16::MAX as f32) as u16;

    let score = BucketScore {
        words_matched_weight,
        intent_tier,
        density_score: density,
        recency_score: recency,
        proximity_score: proximity,
        bm25_quantized,
        recency_raw: candidate.timestamp,
    };

    let highlights = build_highlights(&doc_tokens, &matches);
    let line = highlights.first().map(|h| line_number(&candidate.searchable_text, h.start)).unwrap_or(1);
    let densest = highlights
        .first()
        .map(|_| densest_highlight_start(&candidate.searchable_text, &highlights))
        .unwrap_or(0);
    let snippet = match highlights.first() {
        Some(h) => build_snippet(&candidate.searchable_text, h, line),
        None => {
            let end = char_boundary_at_or_before(&candidate.searchable_text, 200);
            candidate.searchable_text[..end].to_string()
        }
    };

    MatchData {
        item_id: candidate.item_id,
        score,
        highlights,
        line_number: line,
        densest_highlight_start: densest,
        snippet,
        timestamp: candidate.timestamp,
    }
}

