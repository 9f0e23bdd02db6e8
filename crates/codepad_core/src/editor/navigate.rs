//! Cursor navigation and selection commands.

use super::Editor;
use crate::cursor::MoveFlags;
use crate::text::leading_whitespace;
use crate::words::{word_end_after, word_range, word_start_before};

impl Editor {
    pub(super) fn move_up(&mut self, flags: MoveFlags) {
        let pos = self.cursor.position();
        self.move_cursor_to(
            pos.line.saturating_sub(1),
            pos.column,
            flags | MoveFlags::REMEMBER_COLUMN,
        );
    }

    pub(super) fn move_down(&mut self, flags: MoveFlags) {
        let pos = self.cursor.position();
        self.move_cursor_to(pos.line + 1, pos.column, flags | MoveFlags::REMEMBER_COLUMN);
    }

    pub(super) fn page_up(&mut self, flags: MoveFlags) {
        let pos = self.cursor.position();
        let step = self.visible_lines.saturating_sub(1).max(1);
        self.move_cursor_to(
            pos.line.saturating_sub(step),
            pos.column,
            flags | MoveFlags::REMEMBER_COLUMN,
        );
    }

    pub(super) fn page_down(&mut self, flags: MoveFlags) {
        let pos = self.cursor.position();
        let step = self.visible_lines.saturating_sub(1).max(1);
        self.move_cursor_to(
            pos.line.saturating_add(step),
            pos.column,
            flags | MoveFlags::REMEMBER_COLUMN,
        );
    }

    /// One character left, wrapping to the previous line end. With `word`,
    /// skip whitespace and then one run.
    pub(super) fn move_left(&mut self, flags: MoveFlags, word: bool) {
        let pos = self.cursor.position();
        let in_line = if word {
            word_start_before(self.lines.line_text(pos.line), pos.column)
        } else {
            (pos.column > 1).then(|| pos.column - 1)
        };
        match in_line {
            Some(column) => self.move_cursor_to(pos.line, column, flags),
            None if pos.line > 1 => {
                let line = pos.line - 1;
                self.move_cursor_to(line, self.lines.line_len(line) + 1, flags);
            }
            None => self.move_cursor_to(1, 1, flags),
        }
    }

    /// One character right, wrapping to the next line start. With `word`,
    /// skip one run and the whitespace after it; wrapping lands on the next
    /// line's first non-blank column.
    pub(super) fn move_right(&mut self, flags: MoveFlags, word: bool) {
        let pos = self.cursor.position();
        let text = self.lines.line_text(pos.line);
        if pos.column <= self.lines.line_len(pos.line) {
            let column = if word {
                word_end_after(text, pos.column)
            } else {
                pos.column + 1
            };
            self.move_cursor_to(pos.line, column, flags);
        } else if pos.line < self.lines.line_count() {
            let next = pos.line + 1;
            let column = if word {
                leading_whitespace(self.lines.line_text(next)) + 1
            } else {
                1
            };
            self.move_cursor_to(next, column, flags);
        } else {
            self.move_cursor_to(pos.line, pos.column, flags);
        }
    }

    pub(super) fn move_home(&mut self, flags: MoveFlags, document: bool) {
        let line = if document {
            1
        } else {
            self.cursor.position().line
        };
        self.move_cursor_to(line, 1, flags);
    }

    pub(super) fn move_end(&mut self, flags: MoveFlags, document: bool) {
        let line = if document {
            self.lines.line_count()
        } else {
            self.cursor.position().line
        };
        self.move_cursor_to(line, usize::MAX, flags);
    }

    /// Select the whole document with the cursor at `(1, 1)`.
    pub fn select_all(&mut self) {
        self.move_cursor_to(self.lines.line_count(), usize::MAX, MoveFlags::NONE);
        self.move_cursor_to(1, 1, MoveFlags::HIGHLIGHTING);
    }

    /// Move to column 1 of the clamped line.
    pub fn goto_line(&mut self, line: usize) {
        self.move_cursor_to(line, 1, MoveFlags::NONE);
    }

    /// Select the word (or whitespace run) under `(line, column)`.
    ///
    /// The cursor ends at the end of the run. Out-of-range lines and empty
    /// lines leave the editor unchanged.
    pub fn highlight_word_at(&mut self, line: usize, column: usize) {
        if line == 0 || line > self.lines.line_count() {
            return;
        }
        let Some(range) = word_range(self.lines.line_text(line), column) else {
            return;
        };
        self.move_cursor_to(line, range.start, MoveFlags::NONE);
        self.move_cursor_to(line, range.end, MoveFlags::HIGHLIGHTING);
    }

    /// Text of the run under `(line, column)` without moving the cursor.
    pub fn word_at(&self, line: usize, column: usize) -> Option<String> {
        let text = self.lines.line(line)?.text();
        let range = word_range(text, column)?;
        Some(
            text.chars()
                .skip(range.start - 1)
                .take(range.end - range.start)
                .collect(),
        )
    }
}
