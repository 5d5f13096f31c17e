//! §4.B — bounded Damerau–Levenshtein, subsequence matching, the per-word
//! match cascade, and acronym matching.

use clipkeep_core::MatchKind;

/// Bounded Damerau–Levenshtein (optimal string alignment: each substring may
/// be transposed at most once). Insertion, deletion, and substitution each
/// cost 1; transposing two adjacent characters costs 1. Returns `Some(d)`
/// only if `d <= k`; aborts (returning `None`) as soon as an entire DP row's
/// minimum exceeds `k`, per §4.B.
pub fn bounded_damerau_levenshtein(a: &str, b: &str, k: u32) -> Option<u32> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());

    if (n.abs_diff(m)) as u32 > k {
        return None;
    }

    // prev2/prev/curr rows of the DP table, needed because the transposition
    // step looks two rows back.
    let mut prev2: Vec<u32> = vec![0; m + 1];
    let mut prev: Vec<u32> = (0..=m as u32).collect();
    let mut curr: Vec<u32> = vec![0; m + 1];

    for i in 1..=n {
        curr[0] = i as u32;
        let mut row_min = curr[0];
        for j in 1..=m {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let mut val = (prev[j] + 1)
                .min(curr[j - 1] + 1)
                .min(prev[j - 1] + cost);
            if i > 1
                && j > 1
                && a[i - 1] == b[j - 2]
                && a[i - 2] == b[j - 1]
            {
                val = val.min(prev2[j - 2] + 1);
            }
            curr[j] = val;
            row_min = row_min.min(val);
        }
        if row_min > k {
            return None;
        }
        prev2 = std::mem::replace(&mut prev, std::mem::take(&mut curr));
        curr = vec![0; m + 1];
    }

    let d = prev[m];
    if d <= k {
        Some(d)
    } else {
        None
    }
}

/// §4.B subsequence match: every char of `q` (>= 4 chars) appears in `w` in
/// order, `len(q) >= 0.5 * len(w)`, and the first characters match. Returns
/// the number of discontinuous jumps needed to walk through `w`.
pub fn subsequence_match(q: &str, w: &str) -> Option<u32> {
    let q: Vec<char> = q.chars().collect();
    let w: Vec<char> = w.chars().collect();
    if q.len() < 4 {
        return None;
    }
    if (q.len() as f64) < 0.5 * (w.len() as f64) {
        return None;
    }
    if q[0] != w[0] {
        return None;
    }

    let mut gap_count = 0u32;
    let mut last_matched: Option<usize> = None;
    let mut wi = 0usize;
    for &qc in &q {
        let mut found = None;
        while wi < w.len() {
            if w[wi] == qc {
                found = Some(wi);
                break;
            }
            wi += 1;
        }
        let idx = found?;
        if let Some(last) = last_matched {
            if idx != last + 1 {
                gap_count += 1;
            }
        }
        last_matched = Some(idx);
        wi = idx + 1;
    }
    Some(gap_count)
}

fn max_dist_for_len(len: usize) -> u32 {
    if len <= 2 {
        0
    } else if len <= 8 {
        1
    } else {
        2
    }
}

/// §4.B per-word match cascade: exact > prefix > fuzzy (bounded DL with a
/// first-char-mismatch penalty) > subsequence.
pub fn match_word(qw: &str, dw: &str, allow_prefix: bool) -> Option<(MatchKind, u32)> {
    if dw == qw {
        return Some((MatchKind::Exact, 0));
    }
    if allow_prefix && qw.chars().count() >= 2 && dw.starts_with(qw) {
        return Some((MatchKind::Prefix, 0));
    }

    let ceiling = max_dist_for_len(qw.chars().count());
    let mut qchars = qw.chars();
    let mut dchars = dw.chars();
    let (q0, q1) = (qchars.next(), qchars.next());
    let (d0, d1) = (dchars.next(), dchars.next());
    let first_char_mismatch = q0 != d0;
    let is_pure_transposition = matches!((q0, q1, d0, d1), (Some(q0), Some(q1), Some(d0), Some(d1)) if q0 == d1 && q1 == d0);

    if let Some(d) = bounded_damerau_levenshtein(qw, dw, ceiling + 1) {
        let penalized = if first_char_mismatch && !is_pure_transposition {
            d + 1
        } else {
            d
        };
        if penalized <= ceiling {
            return Some((MatchKind::Fuzzy, penalized));
        }
    }

    if let Some(gaps) = subsequence_match(qw, dw) {
        return Some((MatchKind::Subsequence, gaps));
    }

    None
}

/// §4.B acronym match: query word (>= 3 alphanumeric chars) against a
/// sequence of document words starting at `start`. Document words here are
/// already known to be alphanumeric word tokens (the tokenizer never
/// produces mixed word/punct tokens), so no further filtering is needed.
pub fn acronym_match(qw: &str, doc_words: &[&str], start: usize) -> Option<usize> {
    let qw_chars: Vec<char> = qw.chars().collect();
    if qw_chars.len() < 3 || !qw.chars().all(|c| c.is_alphanumeric()) {
        return None;
    }
    let n = qw_chars.len();
    if start + n > doc_words.len() {
        return None;
    }
    for (offset, &expected) in qw_chars.iter().enumerate() {
        let word = doc_words[start + offset];
        match word.chars().next() {
            Some(first) if first == expected => continue,
            _ => return None,
        }
    }
    Some(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dl_exact_match_is_zero() {
        assert_eq!(bounded_damerau_levenshtein("abc", "abc", 2), Some(0));
    }

    #[test]
    fn dl_is_symmetric() {
        let cases = [("kitten", "sitting"), ("abcd", "acbd"), ("foo", "bar")];
        for (a, b) in cases {
            assert_eq!(
                bounded_damerau_levenshtein(a, b, 5),
                bounded_damerau_levenshtein(b, a, 5)
            );
        }
    }

    #[test]
    fn dl_respects_ceiling() {
        assert_eq!(bounded_damerau_levenshtein("hello", "world", 1), None);
    }

    #[test]
    fn dl_counts_adjacent_transposition_as_one() {
        assert_eq!(bounded_damerau_levenshtein("ab", "ba", 1), Some(1));
    }

    #[test]
    fn subsequence_requires_half_length_and_shared_prefix_char() {
        assert_eq!(subsequence_match("abcd", "axbxcxd"), Some(3));
        assert_eq!(subsequence_match("abcd", "zzzzzzzzzzzzzzzzbcd"), None); // too short relative to w
        assert_eq!(subsequence_match("xbcd", "abcd"), None); // first char mismatch
    }

    #[test]
    fn scenario_typo_below_word_length_three() {
        // "imprt" vs "import": length 6, ceiling 1, distance 1 (missing 'o').
        let (kind, dist) = match_word("import", "imprt", true).unwrap();
        assert_eq!(kind, MatchKind::Fuzzy);
        assert_eq!(dist, 1);

        // "bat" vs "cat": length 3, ceiling 1, raw distance 1, first-char
        // mismatch penalty +1 (not a transposition) => 2 > ceiling.
        assert_eq!(match_word("bat", "cat", true), None);
    }

    #[test]
    fn acronym_matches_consecutive_doc_words() {
        let doc_words = ["looks", "good", "to", "me"];
        assert_eq!(acronym_match("lgtm", &doc_words, 0), Some(4));
        assert_eq!(acronym_match("lgt", &doc_words, 0), Some(3));
        assert_eq!(acronym_match("lgtm", &doc_words, 1), None);
    }

    #[test]
    fn acronym_requires_three_alphanumeric_chars() {
        let doc_words = ["a", "b"];
        assert_eq!(acronym_match("ab", &doc_words, 0), None);
    }
}
