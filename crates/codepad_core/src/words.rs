//! Word boundary queries over a single line.
//!
//! A "word" is a maximal run of characters sharing one [`CharClass`].

use std::ops::Range;

/// Character classes used for word selection and word skipping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CharClass {
    Whitespace,
    /// Alphanumerics and `_`.
    Word,
    Symbol,
}

impl CharClass {
    pub fn of(ch: char) -> Self {
        if ch.is_whitespace() {
            Self::Whitespace
        } else if ch.is_alphanumeric() || ch == '_' {
            Self::Word
        } else {
            Self::Symbol
        }
    }
}

/// Column range (1-based, half-open) of the run containing `column`.
///
/// At end of line the run ending there is used. Returns `None` only for
/// an empty line.
pub fn word_range(text: &str, column: usize) -> Option<Range<usize>> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let idx = column.saturating_sub(1).min(chars.len() - 1);
    let class = CharClass::of(chars[idx]);
    let mut start = idx;
    while start > 0 && CharClass::of(chars[start - 1]) == class {
        start -= 1;
    }
    let mut end = idx + 1;
    while end < chars.len() && CharClass::of(chars[end]) == class {
        end += 1;
    }
    Some(start + 1..end + 1)
}

/// Target column for a word-skip to the left within the line.
///
/// Skips whitespace immediately left of `column`, then the run before it.
/// Returns `None` when only whitespace (or nothing) precedes the column,
/// meaning the skip should continue onto the previous line.
pub fn word_start_before(text: &str, column: usize) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut offset = column.saturating_sub(1).min(chars.len());
    while offset > 0 && chars[offset - 1].is_whitespace() {
        offset -= 1;
    }
    if offset == 0 {
        return None;
    }
    let class = CharClass::of(chars[offset - 1]);
    while offset > 0 && CharClass::of(chars[offset - 1]) == class {
        offset -= 1;
    }
    Some(offset + 1)
}

/// Target column for a word-skip to the right within the line.
///
/// Skips the run under the cursor (unless it is whitespace), then any
/// whitespace after it. Never moves past end of line.
pub fn word_end_after(text: &str, column: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut idx = column.saturating_sub(1).min(chars.len());
    if idx < chars.len() && !chars[idx].is_whitespace() {
        let class = CharClass::of(chars[idx]);
        while idx < chars.len() && CharClass::of(chars[idx]) == class {
            idx += 1;
        }
    }
    while idx < chars.len() && chars[idx].is_whitespace() {
        idx += 1;
    }
    idx + 1
}

#[cfg(test)]
mod tests {
    use super::{word_end_after, word_range, word_start_before, CharClass};

    const HEADER: &str = "bool test_function(int param1, string param2)";

    #[test]
    fn classes_split_identifiers_from_punctuation() {
        assert_eq!(CharClass::of('_'), CharClass::Word);
        assert_eq!(CharClass::of('7'), CharClass::Word);
        assert_eq!(CharClass::of('('), CharClass::Symbol);
        assert_eq!(CharClass::of('\t'), CharClass::Whitespace);
    }

    #[test]
    fn word_range_selects_run_under_column() {
        let cases = [(1, 1..5), (5, 5..6), (6, 6..19), (19, 19..20), (46, 45..46)];
        for (column, expected) in cases {
            assert_eq!(word_range(HEADER, column), Some(expected), "column {}", column);
        }
        assert_eq!(word_range("", 1), None);
    }

    #[test]
    fn word_skips_match_editor_navigation() {
        let left = [(4, Some(1)), (14, Some(6)), (24, Some(20)), (1, None)];
        for (column, expected) in left {
            assert_eq!(word_start_before(HEADER, column), expected, "left from {}", column);
        }
        let right = [(1, 6), (5, 6), (6, 19), (23, 24), (24, 30), (46, 46)];
        for (column, expected) in right {
            assert_eq!(word_end_after(HEADER, column), expected, "right from {}", column);
        }
        assert_eq!(word_start_before("    else", 5), None);
    }
}
