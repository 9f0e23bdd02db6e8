//! Text-changing operations.

use super::Editor;
use crate::cursor::MoveFlags;
use crate::error::EditorError;
use crate::history::RunEdit;
use crate::selection::{Position, Selection};
use crate::text::{byte_index, char_at, char_len, leading_whitespace, normalize_line_endings};

impl Editor {
    /// Insert `ch` at the cursor, replacing any selection.
    ///
    /// Registered openers also insert their closer; typing the expected
    /// closer steps over it instead. `\n` and `\t` route to Enter and Tab.
    pub fn handle_character(&mut self, ch: char) {
        match ch {
            '\n' | '\r' => return self.handle_enter(),
            '\t' => return self.handle_tab(false),
            ch if ch.is_control() => return,
            _ => {}
        }
        let pos = self.cursor.position();
        if self.braces.expected() == Some(ch) && !self.cursor.has_selection() {
            self.braces.pop();
            if char_at(self.lines.line_text(pos.line), pos.column) == Some(ch) {
                self.move_cursor_to(pos.line, pos.column + 1, MoveFlags::TYPING);
                self.note_edit();
                return;
            }
        }
        match self.braces.closer_for(ch) {
            Some(close) => {
                let at = self.insert_typed(&format!("{}{}", ch, close));
                self.move_cursor_to(at.line, at.column + 1, MoveFlags::TYPING);
                self.braces.push(close);
            }
            None => {
                let mut buf = [0u8; 4];
                self.insert_typed(ch.encode_utf8(&mut buf));
            }
        }
    }

    /// Insert `text` inside the typing run and leave the cursor after it.
    ///
    /// # Returns
    /// Where the text was inserted.
    fn insert_typed(&mut self, text: &str) -> Position {
        self.begin_typing_undo();
        let at = self.cursor.position();
        let edit = RunEdit::Insert { at, text };
        self.ensure_run_accepts(&edit);
        let end = self.lines.replace_range(&Selection::caret(at), text);
        self.record_run(&edit);
        self.move_to_pos(end, MoveFlags::TYPING);
        self.note_edit();
        at
    }

    /// Remove `start..end` inside the typing run; the cursor lands on `start`.
    fn delete_typed(&mut self, start: Position, end: Position) {
        self.begin_typing_undo();
        let before_cursor = self.cursor.position();
        let range = Selection::new(start, end);
        let removed = self.lines.text_in(&range);
        let edit = RunEdit::Delete {
            start,
            end,
            removed: &removed,
        };
        if self.ensure_run_accepts(&edit) {
            self.remove_range(start, end);
            self.record_run(&edit);
        } else {
            self.end_typing_undo();
            self.remove_range(start, end);
            self.move_to_pos(start, MoveFlags::TYPING);
            self.record_one_shot(
                range.with_text(removed.clone()),
                before_cursor,
                Selection::caret(start).with_text(""),
            );
        }
        self.move_to_pos(start, MoveFlags::TYPING);
        self.note_edit();
    }

    fn remove_range(&mut self, start: Position, end: Position) {
        let joins_lines = end.line == start.line + 1
            && end.column == 1
            && start.column == self.lines.line_len(start.line) + 1;
        if joins_lines {
            self.lines.merge_with_next_line(start.line);
        } else {
            self.lines.replace_range(&Selection::new(start, end), "");
        }
    }

    /// Delete the character before the cursor, or the selection.
    ///
    /// At column 1 the line merges into the previous one. An opener
    /// directly followed by its registered closer is deleted together with
    /// the closer.
    pub(super) fn handle_backspace(&mut self) {
        if self.delete_selection() {
            return;
        }
        let pos = self.cursor.position();
        if pos.column > 1 {
            let text = self.lines.line_text(pos.line);
            let prev = Position::new(pos.line, pos.column - 1);
            let linked_closer = char_at(text, prev.column)
                .and_then(|open| self.braces.closer_for(open))
                .filter(|close| char_at(text, pos.column) == Some(*close));
            let end = if linked_closer.is_some() {
                Position::new(pos.line, pos.column + 1)
            } else {
                pos
            };
            self.delete_typed(prev, end);
            if let Some(close) = linked_closer {
                self.braces.pop_if(close);
            }
        } else if pos.line > 1 {
            let prev = Position::new(pos.line - 1, self.lines.line_len(pos.line - 1) + 1);
            self.delete_typed(prev, pos);
        }
    }

    /// Delete the character after the cursor, or the selection.
    ///
    /// At end of line the next line merges into this one.
    pub(super) fn handle_delete(&mut self) {
        if self.delete_selection() {
            return;
        }
        let pos = self.cursor.position();
        let text = self.lines.line_text(pos.line);
        if let Some(removed) = char_at(text, pos.column) {
            self.delete_typed(pos, Position::new(pos.line, pos.column + 1));
            self.braces.pop_if(removed);
        } else if pos.line < self.lines.line_count() {
            self.delete_typed(pos, Position::new(pos.line + 1, 1));
        }
    }

    /// Split the line at the cursor.
    ///
    /// With the cursor right before the expected closer, the closer moves
    /// two lines down at the original indent and the cursor lands on an
    /// indented blank line between.
    pub(super) fn handle_enter(&mut self) {
        self.begin_typing_undo();
        let pos = self.cursor.position();
        let text = self.lines.line_text(pos.line).to_string();
        let expected = self.braces.expected();
        let split_braces = expected.is_some() && char_at(&text, pos.column) == expected;
        let carry = self.config.auto_indent || split_braces;
        let indent_len = if carry { leading_whitespace(&text) } else { 0 };
        let tail_ws = if indent_len > 0 {
            leading_whitespace(&text[byte_index(&text, pos.column)..])
        } else {
            0
        };

        let strip_end = Position::new(pos.line, pos.column + tail_ws);
        let stripped = self.lines.text_in(&Selection::new(pos, strip_end));
        let strip = RunEdit::Delete {
            start: pos,
            end: strip_end,
            removed: &stripped,
        };
        let first = if tail_ws > 0 {
            strip
        } else {
            RunEdit::Insert { at: pos, text: "\n" }
        };
        self.ensure_run_accepts(&first);

        let split = self.lines.split_line_at(pos.line, pos.column, carry);
        if tail_ws > 0 {
            self.record_run(&strip);
        }
        let inserted = format!("\n{}", split.indent);
        self.record_run(&RunEdit::Insert {
            at: pos,
            text: &inserted,
        });

        if split_braces {
            self.braces.clear();
            let inner = format!("{}{}", split.indent, " ".repeat(self.config.tab_width));
            self.lines.insert_line(pos.line + 1, &inner);
            let added = format!("{}\n", inner);
            self.record_run(&RunEdit::Insert {
                at: Position::new(pos.line + 1, 1),
                text: &added,
            });
            self.move_cursor_to(pos.line + 1, char_len(&inner) + 1, MoveFlags::TYPING);
        } else {
            let indent_chars = char_len(&split.indent);
            let column = if pos.column - 1 < indent_chars {
                pos.column
            } else {
                indent_chars + 1
            };
            self.move_cursor_to(pos.line + 1, column, MoveFlags::TYPING);
        }
        self.note_edit();
    }

    /// Tab / Shift+Tab.
    ///
    /// Without a selection, pads with spaces to the next tab stop. A
    /// selection spanning lines (or one whole line) is indented or
    /// outdented as a block; a partial one-line selection is replaced.
    pub(super) fn handle_tab(&mut self, outdent: bool) {
        if self.cursor.has_selection() {
            let range = self.cursor.current_selection().ordered();
            let whole_line = range.start.line == range.end.line
                && range.start.column == 1
                && range.end.column == self.lines.line_len(range.end.line) + 1;
            if outdent || range.start.line != range.end.line || whole_line {
                self.indent_lines(&range, !outdent);
                return;
            }
            self.delete_selection();
        } else if outdent {
            let line = self.cursor.position().line;
            self.indent_lines(&Selection::caret(Position::new(line, 1)), false);
            return;
        }
        let width = self.config.tab_width.max(1);
        let column = self.cursor.position().column;
        let stop = ((column - 1) / width + 1) * width + 1;
        self.insert_typed(&" ".repeat(stop - column));
    }

    /// Indent (or outdent) every line touched by `range` as one undo unit.
    fn indent_lines(&mut self, range: &Selection, indent: bool) {
        let first = range.start.line;
        let mut last = range.end.line;
        if range.end.column == 1 && last > first {
            last -= 1;
        }
        let width = self.config.tab_width.max(1);
        let edits: Vec<(usize, usize)> = (first..=last)
            .filter_map(|number| {
                let text = self.lines.line_text(number);
                if indent {
                    (!text.trim().is_empty()).then_some((number, 0))
                } else {
                    let strip = text.chars().take(width).take_while(|ch| *ch == ' ').count();
                    (strip > 0).then_some((number, strip))
                }
            })
            .collect();

        self.select_lines(first, last);
        if edits.is_empty() {
            return;
        }
        self.begin_undo();
        let pad = " ".repeat(width);
        for (number, strip) in edits {
            let start = Position::new(number, 1);
            if indent {
                self.lines.replace_range(&Selection::caret(start), &pad);
            } else {
                self.lines
                    .replace_range(&Selection::new(start, Position::new(number, strip + 1)), "");
            }
        }
        self.select_lines(first, last);
        let mut after = self.cursor.current_selection();
        after.text = Some(self.lines.text_in(&after));
        self.end_undo(after);
        self.refresh();
    }

    /// Select whole lines `first..=last`, including the final newline when
    /// a following line exists.
    fn select_lines(&mut self, first: usize, last: usize) {
        self.move_cursor_to(first, 1, MoveFlags::NONE);
        if last < self.lines.line_count() {
            self.move_cursor_to(last + 1, 1, MoveFlags::HIGHLIGHTING);
        } else {
            self.move_cursor_to(last, usize::MAX, MoveFlags::HIGHLIGHTING);
        }
    }

    /// Replace `range` with `text` and put the cursor after it.
    pub(super) fn replace_text(&mut self, range: &Selection, text: &str) -> Position {
        self.cursor.clear_selection(&mut self.lines);
        let end = self.lines.replace_range(range, text);
        self.move_to_pos(end, MoveFlags::NONE);
        end
    }

    /// Remove the selected text without recording history.
    pub(super) fn remove_selection(&mut self) -> Position {
        let range = self.cursor.current_selection().ordered();
        self.replace_text(&range, "")
    }

    /// Text covered by the selection, or empty.
    pub fn selected_text(&self) -> String {
        self.cursor
            .selection()
            .map(|range| self.lines.text_in(&range))
            .unwrap_or_default()
    }

    /// Delete the selection as one undo unit.
    ///
    /// # Returns
    /// `false` when nothing was selected.
    pub fn delete_selection(&mut self) -> bool {
        if !self.cursor.has_selection() {
            return false;
        }
        self.begin_undo();
        let start = self.remove_selection();
        self.end_undo(Selection::caret(start).with_text(""));
        self.refresh();
        true
    }

    /// Replace the selection (or insert at the cursor) as one undo unit.
    pub fn replace_selection(&mut self, text: &str) {
        let text = normalize_line_endings(text);
        self.begin_undo();
        let range = self.cursor.current_selection().ordered();
        let end = self.replace_text(&range, &text);
        self.end_undo(Selection::new(range.start, end).with_text(text.into_owned()));
        self.refresh();
    }

    /// Copy the selection to the clipboard.
    ///
    /// # Returns
    /// `Ok(false)` when nothing was selected.
    ///
    /// # Errors
    /// Propagates clipboard failures.
    pub fn copy_selection(&mut self) -> Result<bool, EditorError> {
        if !self.cursor.has_selection() {
            return Ok(false);
        }
        let text = self.selected_text();
        self.clipboard.set_text(&text)?;
        Ok(true)
    }

    /// Copy then delete the selection.
    ///
    /// # Errors
    /// Propagates clipboard failures; the selection is kept when the copy fails.
    pub fn cut_selection(&mut self) -> Result<bool, EditorError> {
        if !self.copy_selection()? {
            return Ok(false);
        }
        Ok(self.delete_selection())
    }

    /// Replace the selection with the clipboard contents.
    ///
    /// # Errors
    /// Propagates clipboard failures.
    pub fn paste(&mut self) -> Result<bool, EditorError> {
        let text = self.clipboard.get_text()?;
        if text.is_empty() {
            return Ok(false);
        }
        self.replace_selection(&text);
        Ok(true)
    }
}
