//! §4.A — normalizes text to lowercase Unicode and splits it into word,
//! punctuation, and whitespace tokens with byte offsets.
//!
//! Query and document text both go through [`tokenize`]; offsets and word
//! boundaries therefore always line up between the two sides (§4.A).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Word,
    Punct,
    Space,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offsets into the original (not lowered) string.
    pub start: usize,
    pub end: usize,
    pub lowered: String,
}

/// A lazy, restartable tokenizer: re-invoking [`tokenize`] on the same input
/// yields an identical sequence from the start.
pub fn tokenize(input: &str) -> Tokenizer<'_> {
    Tokenizer {
        input,
        iter: input.char_indices().peekable(),
    }
}

pub struct Tokenizer<'a> {
    input: &'a str,
    iter: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let (start, c) = self.iter.next()?;
        let kind = classify(c);
        let mut end = start + c.len_utf8();

        if kind != TokenKind::Punct {
            while let Some(&(next_start, next_c)) = self.iter.peek() {
                if classify(next_c) == kind {
                    end = next_start + next_c.len_utf8();
                    self.iter.next();
                } else {
                    break;
                }
            }
        }

        let raw = &self.input[start..end];
        let lowered = if kind == TokenKind::Space {
            String::new()
        } else {
            raw.chars().flat_map(|c| c.to_lowercase()).collect()
        };

        Some(Token {
            kind,
            start,
            end,
            lowered,
        })
    }
}

fn classify(c: char) -> TokenKind {
    if c.is_whitespace() {
        TokenKind::Space
    } else if c.is_alphanumeric() {
        TokenKind::Word
    } else {
        TokenKind::Punct
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(s: &str) -> Vec<(TokenKind, &str)> {
        tokenize(s).map(|t| (t.kind, &s[t.start..t.end])).collect()
    }

    #[test]
    fn splits_words_punct_and_space() {
        let toks = kinds("hello, world!");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Word, "hello"),
                (TokenKind::Punct, ","),
                (TokenKind::Space, " "),
                (TokenKind::Word, "world"),
                (TokenKind::Punct, "!"),
            ]
        );
    }

    #[test]
    fn lowercases_via_unicode_case_folding() {
        let toks: Vec<_> = tokenize("HELLO Straße").collect();
        assert_eq!(toks[0].lowered, "hello");
        assert_eq!(toks[2].lowered, "straße");
    }

    #[test]
    fn punctuation_tokens_are_single_codepoints() {
        let toks = kinds("192.168.1.1");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Word, "192"),
                (TokenKind::Punct, "."),
                (TokenKind::Word, "168"),
                (TokenKind::Punct, "."),
                (TokenKind::Word, "1"),
                (TokenKind::Punct, "."),
                (TokenKind::Word, "1"),
            ]
        );
    }

    #[test]
    fn token_ranges_cover_input_exactly_once() {
        let s = "foo  bar--baz\tqux";
        let toks: Vec<_> = tokenize(s).collect();
        let mut pos = 0;
        for t in &toks {
            assert_eq!(t.start, pos, "gap or overlap before {:?}", t);
            pos = t.end;
        }
        assert_eq!(pos, s.len());
    }

    #[test]
    fn is_restartable() {
        let a: Vec<_> = tokenize("abc def").collect();
        let b: Vec<_> = tokenize("abc def").collect();
        assert_eq!(a, b);
    }

    #[test]
    fn query_and_document_tokenize_identically() {
        let text = "Hello, World!";
        let query_toks: Vec<_> = tokenize(text).map(|t| t.lowered).collect();
        let doc_toks: Vec<_> = tokenize(text).map(|t| t.lowered).collect();
        assert_eq!(query_toks, doc_toks);
    }
}
