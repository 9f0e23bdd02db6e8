//! Cursor position, selection anchor, and remembered column.

use crate::line_store::{LineId, LineStore};
use crate::selection::{Position, Selection};
use bitflags::bitflags;

bitflags! {
    /// Behavior switches for [`CursorController::move_to`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        /// Extend the selection instead of clearing it.
        const HIGHLIGHTING = 1 << 0;
        /// Vertical move: keep the widest column seen since the last horizontal move.
        const REMEMBER_COLUMN = 1 << 1;
        /// Move caused by an edit inside a typing run.
        const TYPING = 1 << 2;
    }
}

impl MoveFlags {
    pub const NONE: Self = Self::empty();
}

/// Outcome of one cursor move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorMove {
    pub from: Position,
    pub to: Position,
}

impl CursorMove {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Cursor and selection state over a [`LineStore`].
///
/// The controller also keeps the per-line selection and cursor markers in
/// the store up to date, so renderers can read them straight off each line.
#[derive(Clone, Debug, Default)]
pub struct CursorController {
    cursor: Position,
    virtual_column: Option<usize>,
    /// Anchor of the active selection; the other end is the cursor.
    anchor: Option<Position>,
    /// Line carrying the cursor marker, with its line number when marked.
    marked_line: Option<(LineId, usize)>,
}

impl CursorController {
    pub fn position(&self) -> Position {
        self.cursor
    }

    pub fn virtual_column(&self) -> Option<usize> {
        self.virtual_column
    }

    /// Raw selection from anchor to cursor, possibly reversed.
    pub fn selection(&self) -> Option<Selection> {
        self.anchor.map(|anchor| Selection::new(anchor, self.cursor))
    }

    /// True when a non-empty selection exists.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|anchor| anchor != self.cursor)
    }

    /// The selection when one exists, otherwise a caret at the cursor.
    pub fn current_selection(&self) -> Selection {
        match self.anchor {
            Some(anchor) if anchor != self.cursor => Selection::new(anchor, self.cursor),
            _ => Selection::caret(self.cursor),
        }
    }

    /// Back to `(1, 1)` with no selection.
    pub(crate) fn reset(&mut self, lines: &mut LineStore) {
        self.clear_selection(lines);
        self.virtual_column = None;
        self.cursor = Position::default();
        self.marked_line = None;
        self.mark_cursor_line(lines);
    }

    /// Drop the selection and its line markers.
    pub(crate) fn clear_selection(&mut self, lines: &mut LineStore) {
        if let Some(anchor) = self.anchor.take() {
            let low = anchor.line.min(self.cursor.line);
            let high = anchor.line.max(self.cursor.line);
            for number in low..=high {
                if let Some(line) = lines.line_mut(number) {
                    line.clear_selection();
                }
            }
        }
    }

    /// Move the cursor, clamping the target into the document.
    ///
    /// Without [`MoveFlags::HIGHLIGHTING`] any selection is cleared. With it,
    /// the selection is anchored at the pre-move position (if not already
    /// anchored) and extended to the new position.
    pub fn move_to(
        &mut self,
        lines: &mut LineStore,
        line: usize,
        column: usize,
        flags: MoveFlags,
    ) -> CursorMove {
        let from = self.cursor;
        if flags.contains(MoveFlags::HIGHLIGHTING) && self.anchor.is_none() {
            self.anchor = Some(from);
        }

        let line = lines.clamp_line(line);
        let max_column = lines.line_len(line) + 1;
        let column = if flags.contains(MoveFlags::REMEMBER_COLUMN) {
            let remembered = self.virtual_column.unwrap_or(0).max(from.column);
            self.virtual_column = Some(remembered);
            remembered.min(max_column)
        } else {
            self.virtual_column = None;
            column.clamp(1, max_column)
        };
        let to = Position::new(line, column);

        if flags.contains(MoveFlags::HIGHLIGHTING) {
            let old_span = self
                .anchor
                .map(|anchor| (anchor.line.min(from.line), anchor.line.max(from.line)));
            self.cursor = to;
            self.remark_selection(lines, old_span);
        } else {
            self.clear_selection(lines);
            self.cursor = to;
        }
        self.mark_cursor_line(lines);
        debug_assert_eq!(lines.clamp(self.cursor), self.cursor, "cursor out of bounds");
        CursorMove { from, to }
    }

    /// Re-select the ordered span and clear lines that fell out of it.
    fn remark_selection(&mut self, lines: &mut LineStore, old_span: Option<(usize, usize)>) {
        let Some(anchor) = self.anchor else {
            return;
        };
        let ordered = Selection::new(anchor, self.cursor).ordered();
        let (start, end) = (ordered.start, ordered.end);
        if let Some((old_low, old_high)) = old_span {
            for number in old_low..=old_high {
                if number < start.line || number > end.line {
                    if let Some(line) = lines.line_mut(number) {
                        line.clear_selection();
                    }
                }
            }
        }
        for number in start.line..=end.line {
            let Some(line) = lines.line_mut(number) else {
                continue;
            };
            let from = if number == start.line { start.column } else { 1 };
            let to = if number == end.line {
                end.column
            } else {
                line.len() + 1
            };
            line.select(from..to);
        }
    }

    fn mark_cursor_line(&mut self, lines: &mut LineStore) {
        if let Some((previous, hint)) = self.marked_line.take() {
            let index = match lines.line(hint) {
                Some(line) if line.id() == previous => Some(hint - 1),
                _ => lines.index_of(previous),
            };
            if let Some(line) = index.and_then(|idx| lines.line_at_index_mut(idx)) {
                line.set_cursor_column(0);
            }
        }
        if let Some(line) = lines.line_mut(self.cursor.line) {
            line.set_cursor_column(self.cursor.column);
            self.marked_line = Some((line.id(), self.cursor.line));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CursorController, MoveFlags};
    use crate::line_store::LineStore;
    use crate::selection::Position;

    fn setup(text: &str) -> (LineStore, CursorController) {
        let mut lines = LineStore::new();
        lines.set_content(text);
        let mut cursor = CursorController::default();
        cursor.reset(&mut lines);
        (lines, cursor)
    }

    #[test]
    fn remembered_column_survives_short_lines() {
        let (mut lines, mut cursor) = setup("long line here\nab\nanother long one\n");
        cursor.move_to(&mut lines, 1, 12, MoveFlags::NONE);
        cursor.move_to(&mut lines, 2, 12, MoveFlags::REMEMBER_COLUMN);
        assert_eq!(cursor.position(), Position::new(2, 3));
        cursor.move_to(&mut lines, 3, 3, MoveFlags::REMEMBER_COLUMN);
        assert_eq!(cursor.position(), Position::new(3, 12));
        cursor.move_to(&mut lines, 3, 1, MoveFlags::NONE);
        assert_eq!(cursor.virtual_column(), None);
    }

    #[test]
    fn highlighting_marks_each_line_of_the_ordered_span() {
        let (mut lines, mut cursor) = setup("abcd\nefgh\nijkl\n");
        cursor.move_to(&mut lines, 3, 3, MoveFlags::NONE);
        cursor.move_to(&mut lines, 1, 2, MoveFlags::HIGHLIGHTING);
        let marks: Vec<_> = lines.lines().iter().map(|line| line.selection()).collect();
        assert_eq!(marks, [Some(2..5), Some(1..5), Some(1..3)]);

        cursor.move_to(&mut lines, 3, 1, MoveFlags::HIGHLIGHTING);
        let marks: Vec<_> = lines.lines().iter().map(|line| line.selection()).collect();
        assert_eq!(marks, [None, None, Some(1..3)]);

        cursor.move_to(&mut lines, 2, 1, MoveFlags::NONE);
        assert!(!cursor.has_selection());
        assert!(lines.lines().iter().all(|line| line.selection().is_none()));
    }

    #[test]
    fn cursor_column_marker_follows_the_cursor() {
        let (mut lines, mut cursor) = setup("abc\ndef\n");
        assert_eq!(lines.line(1).map(|l| l.cursor_column()), Some(1));
        cursor.move_to(&mut lines, 2, 3, MoveFlags::NONE);
        assert_eq!(lines.line(1).map(|l| l.cursor_column()), Some(0));
        assert_eq!(lines.line(2).map(|l| l.cursor_column()), Some(3));
    }
}
