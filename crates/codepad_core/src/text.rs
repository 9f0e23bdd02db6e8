//! Shared column and line-splitting helpers.
//!
//! Columns are 1-based character positions. Column `len + 1` addresses the
//! end of a line.

use std::borrow::Cow;

/// Number of characters in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of 1-based `column` in `text`.
///
/// Columns past the end map to `text.len()`; column `0` maps to `0`.
pub fn byte_index(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column.saturating_sub(1))
        .map_or(text.len(), |(idx, _)| idx)
}

/// Character at 1-based `column`, if any.
pub fn char_at(text: &str, column: usize) -> Option<char> {
    text.chars().nth(column.checked_sub(1)?)
}

/// Characters in the half-open column range `start..end`, clamped to the line.
pub fn slice_columns(text: &str, start: usize, end: usize) -> &str {
    let from = byte_index(text, start);
    let to = byte_index(text, end).max(from);
    &text[from..to]
}

/// Count of leading whitespace characters.
pub fn leading_whitespace(text: &str) -> usize {
    text.chars().take_while(|ch| ch.is_whitespace()).count()
}

/// Split document text into lines.
///
/// A trailing `\r` is stripped from every line, and a single final `\n`
/// terminates the last line instead of opening an empty one. Empty input
/// yields one empty line.
pub fn split_document(text: &str) -> Vec<&str> {
    let body = text.strip_suffix('\n').unwrap_or(text);
    body.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Rewrite `\r\n` pairs as `\n`.
pub fn normalize_line_endings(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_index_handles_multibyte_and_overflow() {
        let text = "añb";
        assert_eq!(byte_index(text, 1), 0);
        assert_eq!(byte_index(text, 2), 1);
        assert_eq!(byte_index(text, 3), 3);
        assert_eq!(byte_index(text, 4), 4);
        assert_eq!(byte_index(text, 99), 4);
        assert_eq!(slice_columns(text, 2, 3), "ñ");
        assert_eq!(slice_columns(text, 3, 1), "");
    }

    #[test]
    fn split_document_treats_final_newline_as_terminator() {
        let cases: [(&str, &[&str]); 6] = [
            ("", &[""]),
            ("\n", &[""]),
            ("a", &["a"]),
            ("a\n", &["a"]),
            ("a\n\n", &["a", ""]),
            ("a\r\nb\r\n", &["a", "b"]),
        ];
        for (input, expected) in cases {
            assert_eq!(split_document(input), expected, "input: {:?}", input);
        }
    }

    #[test]
    fn leading_whitespace_counts_mixed_indent() {
        assert_eq!(leading_whitespace("\t  x "), 3);
        assert_eq!(leading_whitespace("   "), 3);
        assert_eq!(leading_whitespace("x"), 0);
    }
}
