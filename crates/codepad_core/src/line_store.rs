//! Ordered line buffer with committed and pending text per line.
//!
//! Lines are numbered `1..=line_count` with no gaps. Every structural change
//! renumbers the lines after it. Each line also carries a stable [`LineId`]
//! that survives renumbering so asynchronous highlight results can find
//! their line again.

use crate::highlight::ClassifiedSpan;
use crate::selection::{Position, Selection};
use crate::text::{byte_index, char_len, slice_columns, split_document};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Stable identity of a line across renumbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineId(u64);

impl LineId {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One line of the document.
#[derive(Clone, Debug)]
pub struct Line {
    id: LineId,
    number: usize,
    committed: String,
    pending: Option<String>,
    spans: Vec<ClassifiedSpan>,
    selection: Option<Range<usize>>,
    cursor_column: usize,
}

impl Line {
    fn new(id: LineId, number: usize, committed: String, pending: Option<String>) -> Self {
        Self {
            id,
            number,
            committed,
            pending,
            spans: Vec::new(),
            selection: None,
            cursor_column: 0,
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn number(&self) -> usize {
        self.number
    }

    /// Authoritative text: pending when present, otherwise committed.
    pub fn text(&self) -> &str {
        self.pending.as_deref().unwrap_or(&self.committed)
    }

    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    pub fn pending_text(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        char_len(self.text())
    }

    pub fn is_empty(&self) -> bool {
        self.text().is_empty()
    }

    pub fn spans(&self) -> &[ClassifiedSpan] {
        &self.spans
    }

    /// Selected columns on this line (1-based, half-open).
    pub fn selection(&self) -> Option<Range<usize>> {
        self.selection.clone()
    }

    /// Cursor column when the cursor is on this line, otherwise `0`.
    pub fn cursor_column(&self) -> usize {
        self.cursor_column
    }

    /// Store `text` as pending when it differs from the current text.
    ///
    /// # Returns
    /// `true` when the line changed.
    pub(crate) fn set_text(&mut self, text: String) -> bool {
        if self.text() == text {
            return false;
        }
        self.pending = Some(text);
        true
    }

    /// Fold pending text into committed text.
    pub(crate) fn commit(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if pending != self.committed => {
                self.committed = pending;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_spans(&mut self, spans: Vec<ClassifiedSpan>) {
        self.spans = spans;
    }

    pub(crate) fn select(&mut self, columns: Range<usize>) {
        self.selection = if columns.is_empty() {
            None
        } else {
            Some(columns)
        };
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub(crate) fn set_cursor_column(&mut self, column: usize) {
        self.cursor_column = column;
    }
}

/// Result of [`LineStore::split_line_at`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineSplit {
    /// Leading whitespace dropped from the moved tail.
    pub removed: String,
    /// Indentation copied onto the new line.
    pub indent: String,
}

/// The document's ordered lines.
#[derive(Debug)]
pub struct LineStore {
    lines: Vec<Line>,
    next_id: u64,
    changed: Vec<LineId>,
}

impl Default for LineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LineStore {
    /// Store holding a single empty line.
    pub fn new() -> Self {
        let mut store = Self {
            lines: Vec::new(),
            next_id: 0,
            changed: Vec::new(),
        };
        store.set_content("");
        store
    }

    /// Replace every line with the lines of `text`.
    ///
    /// Lines loaded this way start committed; all of them are reported as
    /// changed.
    pub fn set_content(&mut self, text: &str) {
        self.lines.clear();
        self.changed.clear();
        for (idx, segment) in split_document(text).into_iter().enumerate() {
            let id = self.allocate_id();
            self.lines
                .push(Line::new(id, idx + 1, segment.to_string(), None));
            self.changed.push(id);
        }
    }

    /// All lines joined with `\n`, each line newline-terminated.
    pub fn content(&self) -> String {
        let capacity = self.lines.iter().map(|line| line.text().len() + 1).sum();
        let mut out = String::with_capacity(capacity);
        for line in &self.lines {
            out.push_str(line.text());
            out.push('\n');
        }
        out
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Line by 1-based number.
    pub fn line(&self, number: usize) -> Option<&Line> {
        self.lines.get(number.checked_sub(1)?)
    }

    pub(crate) fn line_mut(&mut self, number: usize) -> Option<&mut Line> {
        self.lines.get_mut(number.checked_sub(1)?)
    }

    pub(crate) fn line_at_index_mut(&mut self, index: usize) -> Option<&mut Line> {
        self.lines.get_mut(index)
    }

    /// Text of the clamped line.
    pub fn line_text(&self, number: usize) -> &str {
        self.line(self.clamp_line(number))
            .map_or("", |line| line.text())
    }

    /// Length of the clamped line in characters.
    pub fn line_len(&self, number: usize) -> usize {
        char_len(self.line_text(number))
    }

    pub fn clamp_line(&self, number: usize) -> usize {
        number.clamp(1, self.lines.len().max(1))
    }

    /// Clamp into `[1, line_count] x [1, len + 1]`.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = self.clamp_line(pos.line);
        Position::new(line, pos.column.clamp(1, self.line_len(line) + 1))
    }

    /// Position just past the last character of the document.
    pub fn end_position(&self) -> Position {
        let last = self.line_count();
        Position::new(last, self.line_len(last) + 1)
    }

    /// Current 0-based index of the line with `id`.
    pub fn index_of(&self, id: LineId) -> Option<usize> {
        self.lines.iter().position(|line| line.id == id)
    }

    /// Text covered by `selection`, lines joined with `\n`.
    pub fn text_in(&self, selection: &Selection) -> String {
        let ordered = selection.ordered();
        let start = self.clamp(ordered.start);
        let end = self.clamp(ordered.end);
        if start == end {
            return String::new();
        }
        if start.line == end.line {
            return slice_columns(self.line_text(start.line), start.column, end.column)
                .to_string();
        }
        let mut out = String::new();
        for number in start.line..=end.line {
            let text = self.line_text(number);
            let from = if number == start.line { start.column } else { 1 };
            let to = if number == end.line {
                end.column
            } else {
                char_len(text) + 1
            };
            if number != start.line {
                out.push('\n');
            }
            out.push_str(slice_columns(text, from, to));
        }
        out
    }

    /// Replace the text covered by `selection` with `new_text`.
    ///
    /// Handles every shape: single-line edits, a single line split by a
    /// multi-line insertion, and multi-line ranges whose enclosed lines are
    /// removed. Head of the first line and tail of the last line survive.
    ///
    /// # Returns
    /// The position just past the inserted text.
    pub fn replace_range(&mut self, selection: &Selection, new_text: &str) -> Position {
        let ordered = selection.ordered();
        let start = self.clamp(ordered.start);
        let end = self.clamp(ordered.end);
        let start_idx = start.line - 1;
        let end_idx = end.line - 1;

        let start_text = self.lines[start_idx].text();
        let head = start_text[..byte_index(start_text, start.column)].to_string();
        let end_text = self.lines[end_idx].text();
        let tail = end_text[byte_index(end_text, end.column)..].to_string();

        let segments: Vec<&str> = new_text
            .split('\n')
            .map(|segment| segment.strip_suffix('\r').unwrap_or(segment))
            .collect();
        let last_segment = segments.len() - 1;

        if end_idx > start_idx {
            self.lines.drain(start_idx + 1..=end_idx);
        }

        let result = if last_segment == 0 {
            let mut text = head;
            text.push_str(segments[0]);
            let column = char_len(&text) + 1;
            text.push_str(&tail);
            self.set_line_text(start_idx, text);
            Position::new(start.line, column)
        } else {
            let mut first = head;
            first.push_str(segments[0]);
            self.set_line_text(start_idx, first);
            for (offset, segment) in segments[1..].iter().enumerate() {
                let mut text = segment.to_string();
                if offset + 1 == last_segment {
                    text.push_str(&tail);
                }
                self.insert_at_index(start_idx + 1 + offset, text);
            }
            Position::new(
                start.line + last_segment,
                char_len(segments[last_segment]) + 1,
            )
        };

        if end_idx > start_idx || last_segment > 0 {
            self.renumber_from(start_idx + 1);
        }
        result
    }

    /// Append the next line onto `number` and remove the next line.
    ///
    /// # Returns
    /// `false` when `number` is the last line.
    pub fn merge_with_next_line(&mut self, number: usize) -> bool {
        if number == 0 || number >= self.lines.len() {
            return false;
        }
        let next = self.lines.remove(number);
        let mut text = self.lines[number - 1].text().to_string();
        text.push_str(next.text());
        self.set_line_text(number - 1, text);
        self.renumber_from(number);
        true
    }

    /// Break line `number` at `column`, moving the tail to a new next line.
    ///
    /// With `carry_indent`, the new line starts with the original line's
    /// leading whitespace and the tail's own leading whitespace is dropped.
    pub fn split_line_at(&mut self, number: usize, column: usize, carry_indent: bool) -> LineSplit {
        let number = self.clamp_line(number);
        let idx = number - 1;
        let text = self.lines[idx].text();
        let at = byte_index(text, column.max(1));
        let head = text[..at].to_string();
        let mut tail = text[at..].to_string();
        let mut split = LineSplit {
            removed: String::new(),
            indent: String::new(),
        };
        if carry_indent {
            split.indent = text
                .chars()
                .take_while(|ch| ch.is_whitespace())
                .collect();
            if !split.indent.is_empty() {
                let trimmed = tail.trim_start();
                split.removed = tail[..tail.len() - trimmed.len()].to_string();
                tail = format!("{}{}", split.indent, trimmed);
            }
        }
        self.set_line_text(idx, head);
        self.insert_at_index(idx + 1, tail);
        self.renumber_from(idx + 1);
        split
    }

    /// Insert a new pending line so it becomes line `number`.
    pub fn insert_line(&mut self, number: usize, text: &str) {
        let idx = number.clamp(1, self.lines.len() + 1) - 1;
        self.insert_at_index(idx, text.to_string());
        self.renumber_from(idx);
    }

    /// Fold every pending text into committed text.
    ///
    /// # Returns
    /// Ids of lines whose committed text changed.
    pub(crate) fn commit_pending(&mut self) -> Vec<LineId> {
        self.lines
            .iter_mut()
            .filter_map(|line| line.commit().then_some(line.id))
            .collect()
    }

    /// Drain ids of lines touched since the last call.
    pub(crate) fn take_changed(&mut self) -> Vec<LineId> {
        let mut changed = std::mem::take(&mut self.changed);
        let mut seen = std::collections::HashSet::with_capacity(changed.len());
        changed.retain(|id| seen.insert(*id));
        changed
    }

    fn set_line_text(&mut self, idx: usize, text: String) {
        let line = &mut self.lines[idx];
        if line.set_text(text) {
            self.changed.push(line.id);
        }
    }

    fn insert_at_index(&mut self, idx: usize, text: String) {
        let id = self.allocate_id();
        self.lines
            .insert(idx, Line::new(id, idx + 1, String::new(), Some(text)));
        self.changed.push(id);
    }

    fn allocate_id(&mut self) -> LineId {
        let id = LineId(self.next_id);
        self.next_id += 1;
        id
    }

    fn renumber_from(&mut self, idx: usize) {
        for (offset, line) in self.lines.iter_mut().enumerate().skip(idx) {
            line.number = offset + 1;
        }
        debug_assert!(
            self.lines
                .iter()
                .enumerate()
                .all(|(offset, line)| line.number == offset + 1),
            "line numbers must be contiguous"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::LineStore;
    use crate::selection::{Position, Selection};

    fn store(text: &str) -> LineStore {
        let mut store = LineStore::new();
        store.set_content(text);
        store
    }

    fn texts(store: &LineStore) -> Vec<&str> {
        store.lines().iter().map(|line| line.text()).collect()
    }

    fn range(start: (usize, usize), end: (usize, usize)) -> Selection {
        Selection::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
    }

    #[test]
    fn content_round_trips_and_normalizes_crlf() {
        let text = "alpha\n\n  beta\ngamma\n";
        assert_eq!(store(text).content(), text);
        assert_eq!(store("a\r\nb\r\n").content(), "a\nb\n");
        assert_eq!(store("").line_count(), 1);
    }

    #[test]
    fn single_line_replace_keeps_line_count() {
        let mut lines = store("hello world\nnext\n");
        let end = lines.replace_range(&range((1, 7), (1, 12)), "there");
        assert_eq!(end, Position::new(1, 12));
        assert_eq!(texts(&lines), ["hello there", "next"]);
        assert_eq!(lines.line(1).and_then(|l| l.pending_text()), Some("hello there"));
        assert_eq!(lines.line(1).map(|l| l.committed_text()), Some("hello world"));
    }

    #[test]
    fn multi_line_insert_splits_source_line() {
        let mut lines = store("abcdef\nlast\n");
        let end = lines.replace_range(&Selection::caret(Position::new(1, 4)), "X\nY\nZ");
        assert_eq!(end, Position::new(3, 2));
        assert_eq!(texts(&lines), ["abcX", "Y", "Zdef", "last"]);
        let numbers: Vec<usize> = lines.lines().iter().map(|l| l.number()).collect();
        assert_eq!(numbers, [1, 2, 3, 4]);
    }

    #[test]
    fn multi_line_range_removes_enclosed_lines() {
        let mut lines = store("one\ntwo\nthree\nfour\n");
        let end = lines.replace_range(&range((3, 3), (1, 2)), "-");
        assert_eq!(end, Position::new(1, 3));
        assert_eq!(texts(&lines), ["o-ree", "four"]);
        assert_eq!(lines.line(2).map(|l| l.number()), Some(2));
    }

    #[test]
    fn text_in_joins_lines_with_newline() {
        let lines = store("one\ntwo\nthree\n");
        assert_eq!(lines.text_in(&range((1, 2), (3, 3))), "ne\ntwo\nth");
        assert_eq!(lines.text_in(&range((1, 4), (2, 1))), "\n");
        assert_eq!(lines.text_in(&range((2, 2), (2, 2))), "");
    }

    #[test]
    fn merge_and_split_are_inverse() {
        let mut lines = store("    if (x)\n    {\n");
        assert!(lines.merge_with_next_line(1));
        assert_eq!(texts(&lines), ["    if (x)    {"]);
        assert!(!lines.merge_with_next_line(1));

        let split = lines.split_line_at(1, 11, false);
        assert!(split.removed.is_empty());
        assert_eq!(texts(&lines), ["    if (x)", "    {"]);
    }

    #[test]
    fn split_with_indent_replaces_tail_whitespace() {
        let mut lines = store("    call(a,   b)\n");
        let split = lines.split_line_at(1, 12, true);
        assert_eq!(split.indent, "    ");
        assert_eq!(split.removed, "   ");
        assert_eq!(texts(&lines), ["    call(a,", "    b)"]);
    }

    #[test]
    fn line_ids_survive_renumbering_and_commit_reports_changes() {
        let mut lines = store("a\nb\nc\n");
        let id_c = lines.line(3).map(|l| l.id()).expect("line 3");
        lines.insert_line(1, "z");
        assert_eq!(lines.index_of(id_c), Some(3));
        assert_eq!(lines.line(4).map(|l| l.number()), Some(4));

        let committed = lines.commit_pending();
        assert_eq!(committed.len(), 1);
        assert_eq!(lines.line(1).and_then(|l| l.pending_text()), None);
        assert_eq!(lines.line(1).map(|l| l.committed_text()), Some("z"));
    }

    #[test]
    fn clamp_treats_out_of_range_as_document_edges() {
        let lines = store("abc\nde\n");
        assert_eq!(lines.clamp(Position::new(0, 0)), Position::new(1, 1));
        assert_eq!(
            lines.clamp(Position::new(usize::MAX, usize::MAX)),
            Position::new(2, 3)
        );
        assert_eq!(lines.end_position(), Position::new(2, 3));
    }
}
