//! §4.G.3 — the four-tier intent classification, evaluated top-down.

use clipkeep_core::MatchKind;

use crate::matching::PositionedMatch;

fn word_matches(matches: &[PositionedMatch]) -> Vec<&PositionedMatch> {
    matches.iter().filter(|m| !m.is_punct).collect()
}

/// True iff `word_index` is strictly increasing across the given matches,
/// in the order given (which callers pass in query order).
fn strictly_increasing_word_positions(words: &[&PositionedMatch]) -> bool {
    let idxs: Vec<usize> = words.iter().filter_map(|m| m.word_index).collect();
    if idxs.len() != words.len() {
        return false;
    }
    idxs.windows(2).all(|w| w[0] < w[1])
}

/// `full_lowered` is `Qa` (§4.G.1); `doc_lower` is the candidate's lowercased
/// `searchable_text`; `matches` is `M` in query order.
pub(crate) fn compute_tier(full_lowered: &str, doc_lower: &str, matches: &[PositionedMatch]) -> u8 {
    let words = word_matches(matches);

    // Tier 4: literal prefix, or first query word is the first doc word
    // (word_index 0) with distance 0, and all matched words increase in
    // document position.
    let starts_with_q = !full_lowered.is_empty() && doc_lower.starts_with(full_lowered);
    let first_word_is_exact_at_zero = words
        .first()
        .is_some_and(|m| m.edit_dist == 0 && m.word_index == Some(0));
    if starts_with_q || (first_word_is_exact_at_zero && strictly_increasing_word_positions(&words)) {
        return 4;
    }

    // Tier 3: literal substring, or at least one Acronym match.
    let contains_q = !full_lowered.is_empty() && doc_lower.contains(full_lowered);
    let has_acronym = matches.iter().any(|m| m.kind == MatchKind::Acronym);
    if contains_q || has_acronym {
        return 3;
    }

    // Tier 2: every query word matched within edit distance <= 1, strictly
    // increasing document position.
    let all_close = !words.is_empty() && words.iter().all(|m| m.edit_dist <= 1);
    if all_close && strictly_increasing_word_positions(&words) {
        return 2;
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipkeep_core::MatchKind;

    fn pm(kind: MatchKind, dist: u32, word_index: usize) -> PositionedMatch {
        PositionedMatch {
            query_word: "x".into(),
            kind,
            edit_dist: dist,
            match_weight: 1,
            doc_pos: word_index,
            end_doc_pos: word_index,
            word_index: Some(word_index),
            is_punct: false,
        }
    }

    #[test]
    fn literal_prefix_is_tier_4() {
        assert_eq!(compute_tier("hello wo", "hello world foo", &[pm(MatchKind::Exact, 0, 0)]), 4);
    }

    #[test]
    fn substring_without_prefix_is_tier_3() {
        let matches = [pm(MatchKind::Exact, 0, 1)];
        assert_eq!(compute_tier("hello wo", "say hello world", &matches), 3);
    }

    #[test]
    fn acronym_alone_is_tier_3() {
        let matches = [pm(MatchKind::Acronym, 0, 0)];
        assert_eq!(compute_tier("lgtm", "looks good to me", &matches), 3);
    }

    #[test]
    fn fuzzy_within_one_in_order_is_tier_2() {
        let matches = [pm(MatchKind::Fuzzy, 1, 0), pm(MatchKind::Fuzzy, 1, 2)];
        assert_eq!(compute_tier("zzz yyy", "aaa bbb ccc", &matches), 2);
    }

    #[test]
    fn out_of_order_or_far_matches_fall_to_tier_1() {
        let matches = [pm(MatchKind::Fuzzy, 2, 0)];
        assert_eq!(compute_tier("zzz", "aaa bbb ccc", &matches), 1);
    }
}
