//! Undo bookkeeping: one-shot items, typing runs, and replay.

use super::Editor;
use crate::cursor::MoveFlags;
use crate::history::{ItemState, RunEdit, UndoItem};
use crate::selection::{Position, Selection};

impl Editor {
    /// Open a one-shot item capturing the current selection (or caret).
    pub(super) fn begin_undo(&mut self) {
        self.end_typing_undo();
        let selected = self.cursor.has_selection();
        let mut before = self.cursor.current_selection();
        before.text = Some(self.lines.text_in(&before));
        self.history
            .open(UndoItem::begin(before, self.cursor.position(), selected));
    }

    /// Close the one-shot item opened by [`Self::begin_undo`].
    pub(super) fn end_undo(&mut self, after: Selection) {
        let selected = self.cursor.has_selection();
        let cursor = self.cursor.position();
        if let Some(item) = self.history.pending_mut() {
            item.after = after;
            item.after_selected = selected;
            item.after_cursor = cursor;
            item.state = ItemState::Finished;
        }
    }

    /// Open a typing run unless one is already open.
    ///
    /// An active selection is removed first, inside the new run.
    pub(super) fn begin_typing_undo(&mut self) {
        if self.history.is_run_open() {
            return;
        }
        self.begin_undo();
        if self.cursor.has_selection() {
            self.remove_selection();
        }
        let cursor = self.cursor.position();
        if let Some(item) = self.history.pending_mut() {
            item.before.normalize();
            item.after = Selection::caret(cursor);
            item.state = ItemState::TypingRun;
        }
    }

    /// Close the open typing run, if any.
    pub(super) fn end_typing_undo(&mut self) {
        let Some(run) = self.history.open_run() else {
            return;
        };
        let after_text = self.lines.text_in(&run.after);
        self.history
            .finish_run(after_text, self.cursor.position());
    }

    /// Make sure the open run can absorb `edit`, starting a fresh run if not.
    ///
    /// # Returns
    /// `false` when even a fresh run cannot represent the edit.
    pub(super) fn ensure_run_accepts(&mut self, edit: &RunEdit<'_>) -> bool {
        self.begin_typing_undo();
        if self.history.accepts(edit) {
            return true;
        }
        self.end_typing_undo();
        self.begin_typing_undo();
        self.history.accepts(edit)
    }

    pub(super) fn record_run(&mut self, edit: &RunEdit<'_>) {
        if !self.history.record(edit) {
            tracing::debug!(?edit, "typing edit fell outside the open run");
        }
    }

    /// Push a finished item for an edit a typing run cannot express.
    pub(super) fn record_one_shot(
        &mut self,
        before: Selection,
        before_cursor: Position,
        after: Selection,
    ) {
        self.end_typing_undo();
        let mut item = UndoItem::begin(before, before_cursor, false);
        item.after_cursor = self.cursor.position();
        item.after = after;
        item.state = ItemState::Finished;
        self.history.open(item);
    }

    /// Select from `anchor` to `end`, leaving the cursor at `end`.
    pub(super) fn select_range(&mut self, anchor: Position, end: Position) {
        self.move_to_pos(anchor, MoveFlags::NONE);
        self.move_to_pos(end, MoveFlags::HIGHLIGHTING);
    }

    /// Restore a selection snapshot with the cursor at the end it had.
    fn restore_selection(&mut self, range: &Selection, cursor: Position) {
        let ordered = range.ordered();
        if cursor == ordered.start {
            self.select_range(ordered.end, ordered.start);
        } else {
            self.select_range(ordered.start, ordered.end);
        }
    }

    /// Revert the most recent edit.
    ///
    /// # Returns
    /// `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.end_typing_undo();
        let Some(item) = self.history.pop_undo() else {
            return false;
        };
        let target = item.after.ordered();
        self.move_to_pos(target.start, MoveFlags::NONE);
        self.replace_text(&target, item.before.text.as_deref().unwrap_or(""));
        if item.before_selected {
            self.restore_selection(&item.before, item.before_cursor);
        } else {
            self.move_to_pos(item.before_cursor, MoveFlags::NONE);
        }
        self.history.push_redo(item);
        self.refresh();
        true
    }

    /// Re-apply the most recently undone edit.
    ///
    /// # Returns
    /// `false` when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.end_typing_undo();
        let Some(item) = self.history.pop_redo() else {
            return false;
        };
        let target = item.before.ordered();
        self.move_to_pos(target.start, MoveFlags::NONE);
        self.replace_text(&target, item.after.text.as_deref().unwrap_or(""));
        if item.after_selected {
            self.restore_selection(&item.after, item.after_cursor);
        } else {
            self.move_to_pos(item.after_cursor, MoveFlags::NONE);
        }
        self.history.push_undo(item);
        self.refresh();
        true
    }
}
