//! Brace matching for method-body extraction
//!
//! Two strategies:
//!
//! - [`BraceScan::Naive`] counts every `{` and `}` in the text. Braces inside
//!   string literals, char literals and comments are counted too, so a body
//!   such as `Log("{")` throws the depth off. This is the default and the
//!   historical behavior of the audit.
//! - [`BraceScan::Lexical`] runs a small C# tokenizer and only counts braces
//!   that appear in code.
//!
//! Known gaps in the lexical mode: raw string literals (`"""`) and string
//! literals nested inside interpolation holes are not modelled.

use serde::{Deserialize, Serialize};

/// How to find the closing brace of a method body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceScan {
    #[default]
    Naive,
    Lexical,
}

/// Find the index of the `}` matching the `{` at `open`.
///
/// Returns `None` if `open` is not a `{` or the text ends before the depth
/// returns to zero.
pub fn find_matching_brace(text: &str, open: usize, scan: BraceScan) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(open) != Some(&b'{') {
        return None;
    }
    match scan {
        BraceScan::Naive => match_naive(bytes, open),
        BraceScan::Lexical => match_lexical(bytes, open),
    }
}

fn match_naive(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Code,
    LineComment,
    BlockComment,
    Str,
    VerbatimStr,
    Char,
}

fn match_lexical(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut state = LexState::Code;
    let mut i = open;

    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            LexState::Code => match b {
                b'{' => depth += 1,
                b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i);
                    }
                }
                b'/' if next == Some(b'/') => {
                    state = LexState::LineComment;
                    i += 1;
                }
                b'/' if next == Some(b'*') => {
                    state = LexState::BlockComment;
                    i += 1;
                }
                b'"' => {
                    state = if is_verbatim_open(bytes, i) {
                        LexState::VerbatimStr
                    } else {
                        LexState::Str
                    };
                }
                b'\'' => state = LexState::Char,
                _ => {}
            },
            LexState::LineComment => {
                if b == b'\n' {
                    state = LexState::Code;
                }
            }
            LexState::BlockComment => {
                if b == b'*' && next == Some(b'/') {
                    state = LexState::Code;
                    i += 1;
                }
            }
            LexState::Str => match b {
                b'\\' => i += 1,
                b'"' | b'\n' => state = LexState::Code,
                _ => {}
            },
            LexState::VerbatimStr => {
                if b == b'"' {
                    if next == Some(b'"') {
                        i += 1;
                    } else {
                        state = LexState::Code;
                    }
                }
            }
            LexState::Char => match b {
                b'\\' => i += 1,
                b'\'' | b'\n' => state = LexState::Code,
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// `@"`, `$@"` and `@$"` open verbatim strings
fn is_verbatim_open(bytes: &[u8], quote: usize) -> bool {
    let prev = quote.checked_sub(1).map(|p| bytes[p]);
    let prev2 = quote.checked_sub(2).map(|p| bytes[p]);
    matches!((prev2, prev), (_, Some(b'@')) | (Some(b'@'), Some(b'$')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outer_match_for_nested_braces() {
        let text = "{ a(); { b(); } c(); }";
        let end = find_matching_brace(text, 0, BraceScan::Naive).expect("balanced");
        assert_eq!(end, text.len() - 1);
        assert_eq!(find_matching_brace(text, 7, BraceScan::Naive), Some(14));
    }

    #[test]
    fn test_unbalanced_returns_none() {
        assert_eq!(find_matching_brace("{ a(); { b(); }", 0, BraceScan::Naive), None);
        assert_eq!(find_matching_brace("{ a(); { b(); }", 0, BraceScan::Lexical), None);
    }

    #[test]
    fn test_not_an_open_brace() {
        assert_eq!(find_matching_brace("x { }", 0, BraceScan::Naive), None);
        assert_eq!(find_matching_brace("{}", 5, BraceScan::Naive), None);
    }

    #[test]
    fn test_naive_counts_braces_in_strings() {
        // The literal "}" closes the body early in naive mode
        let text = r#"{ Log("}"); Run(); }"#;
        assert_eq!(find_matching_brace(text, 0, BraceScan::Naive), Some(7));
        assert_eq!(
            find_matching_brace(text, 0, BraceScan::Lexical),
            Some(text.len() - 1)
        );
    }

    #[test]
    fn test_lexical_skips_comments_and_chars() {
        let text = "{ // }\n /* { */ var c = '}'; var s = @\"a\"\"}\"; }";
        assert_eq!(
            find_matching_brace(text, 0, BraceScan::Lexical),
            Some(text.len() - 1)
        );
    }

    #[test]
    fn test_lexical_handles_escaped_quotes() {
        let text = r#"{ var s = "a\"}"; }"#;
        assert_eq!(
            find_matching_brace(text, 0, BraceScan::Lexical),
            Some(text.len() - 1)
        );
    }

    #[test]
    fn test_matching_is_idempotent() {
        let text = "{ if (x) { y(); } }";
        let first = find_matching_brace(text, 0, BraceScan::Naive);
        let second = find_matching_brace(text, 0, BraceScan::Naive);
        assert_eq!(first, second);
    }
}
