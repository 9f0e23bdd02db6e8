//! Range-snapshot undo/redo history with typing-run coalescing.
//!
//! Each [`UndoItem`] stores the range and text before an edit and the range
//! and text after it. Undo replaces the `after` range with `before.text`;
//! redo replaces the `before` range with `after.text`.
//!
//! Consecutive keystrokes accumulate into one open item (a typing run)
//! until something closes it: an idle timeout, a non-typing cursor move, or
//! a structural edit.

use crate::selection::{Position, Selection};
use std::collections::VecDeque;

/// Fixed-capacity stack that evicts its oldest entry on overflow.
#[derive(Clone, Debug)]
pub struct BoundedStack<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedStack<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity.min(64)),
            capacity: capacity.max(1),
        }
    }

    /// Push `item`, returning the evicted oldest entry when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        let evicted = if self.items.len() >= self.capacity {
            self.items.pop_front()
        } else {
            None
        };
        self.items.push_back(item);
        evicted
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_back()
    }

    pub fn top(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.items.back_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Lifecycle of an undo item.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemState {
    /// Opened by a one-shot edit that has not recorded its result yet.
    Pending,
    /// Open typing run still absorbing keystrokes.
    TypingRun,
    Finished,
}

/// One reversible edit.
#[derive(Clone, Debug)]
pub struct UndoItem {
    pub before: Selection,
    pub after: Selection,
    pub before_cursor: Position,
    pub after_cursor: Position,
    /// Whether `before` was an active selection to restore on undo.
    pub before_selected: bool,
    pub after_selected: bool,
    pub state: ItemState,
}

impl UndoItem {
    /// Item opened over `before`, waiting for its result.
    pub fn begin(before: Selection, cursor: Position, selected: bool) -> Self {
        Self {
            after: Selection::caret(cursor),
            before,
            before_cursor: cursor,
            after_cursor: cursor,
            before_selected: selected,
            after_selected: false,
            state: ItemState::Pending,
        }
    }

    /// True when the item would not change the document.
    fn is_noop(&self) -> bool {
        self.before.is_empty()
            && self.before.text.as_deref().unwrap_or("").is_empty()
            && self.after.text.as_deref().unwrap_or("").is_empty()
    }
}

/// One primitive edit inside a typing run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunEdit<'a> {
    Insert { at: Position, text: &'a str },
    Delete { start: Position, end: Position, removed: &'a str },
}

/// Bounded undo and redo stacks.
#[derive(Clone, Debug)]
pub struct UndoHistory {
    undo: BoundedStack<UndoItem>,
    redo: BoundedStack<UndoItem>,
}

impl UndoHistory {
    pub fn new(undo_capacity: usize, redo_capacity: usize) -> Self {
        Self {
            undo: BoundedStack::new(undo_capacity),
            redo: BoundedStack::new(redo_capacity),
        }
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Open a new item. Any new edit invalidates redo history.
    pub fn open(&mut self, item: UndoItem) {
        self.redo.clear();
        if self.undo.push(item).is_some() {
            tracing::debug!("undo history full; evicted oldest entry");
        }
    }

    /// The top item when it is still waiting for a one-shot result.
    pub fn pending_mut(&mut self) -> Option<&mut UndoItem> {
        self.undo
            .top_mut()
            .filter(|item| item.state == ItemState::Pending)
    }

    pub fn is_run_open(&self) -> bool {
        self.open_run().is_some()
    }

    pub fn open_run(&self) -> Option<&UndoItem> {
        self.undo
            .top()
            .filter(|item| item.state == ItemState::TypingRun)
    }

    pub fn open_run_mut(&mut self) -> Option<&mut UndoItem> {
        self.undo
            .top_mut()
            .filter(|item| item.state == ItemState::TypingRun)
    }

    /// Whether the open run can absorb `edit` without losing information.
    ///
    /// Insertions must land inside the typed region. Deletions are either
    /// inside the typed region, directly before an empty typed region
    /// (backspacing into prior text), or directly after it (forward
    /// deleting prior text).
    pub fn accepts(&self, edit: &RunEdit<'_>) -> bool {
        let Some(run) = self.open_run() else {
            return false;
        };
        let after = &run.after;
        match *edit {
            RunEdit::Insert { at, .. } => {
                !run.before.is_end_before_start() && after.start <= at && at <= after.end
            }
            RunEdit::Delete { start, end, .. } => {
                (after.start <= start && end <= after.end)
                    || (end == after.start
                        && after.is_empty()
                        && !run.before.is_start_before_end())
                    || (start == after.end && !run.before.is_end_before_start())
            }
        }
    }

    /// Fold `edit` into the open run.
    ///
    /// # Returns
    /// `false` when no run is open or the run cannot absorb the edit.
    pub fn record(&mut self, edit: &RunEdit<'_>) -> bool {
        if !self.accepts(edit) {
            return false;
        }
        let Some(run) = self.open_run_mut() else {
            return false;
        };
        match *edit {
            RunEdit::Insert { at, text } => {
                run.after.end = run.after.end.shifted_by_insert(at, text);
            }
            RunEdit::Delete {
                start,
                end,
                removed,
            } => {
                if run.after.start <= start && end <= run.after.end {
                    run.after.end = run.after.end.shifted_by_delete(start, end);
                } else if end == run.after.start && run.after.is_empty() {
                    run.before.end = start;
                    let before_text = run.before.text.get_or_insert_with(String::new);
                    before_text.insert_str(0, removed);
                    run.after = Selection::caret(start);
                } else {
                    run.before.end = run.before.end.advance(removed);
                    run.before
                        .text
                        .get_or_insert_with(String::new)
                        .push_str(removed);
                }
            }
        }
        true
    }

    /// Close the open run with the text now covering its `after` range.
    ///
    /// Runs that changed nothing are dropped.
    pub fn finish_run(&mut self, after_text: String, cursor: Position) {
        let Some(run) = self.open_run_mut() else {
            return;
        };
        run.after.text = Some(after_text);
        run.before.normalize();
        run.after_cursor = cursor;
        run.state = ItemState::Finished;
        if run.is_noop() {
            self.undo.pop();
        }
    }

    pub fn pop_undo(&mut self) -> Option<UndoItem> {
        self.undo.pop()
    }

    pub fn pop_redo(&mut self) -> Option<UndoItem> {
        self.redo.pop()
    }

    pub fn push_redo(&mut self, item: UndoItem) {
        self.redo.push(item);
    }

    /// Return a redone item to the undo stack without touching redo.
    pub fn push_undo(&mut self, item: UndoItem) {
        self.undo.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    fn open_run(history: &mut UndoHistory, at: Position) {
        let mut item = UndoItem::begin(Selection::caret(at).with_text(""), at, false);
        item.state = ItemState::TypingRun;
        history.open(item);
    }

    #[test]
    fn bounded_stack_evicts_oldest() {
        let mut stack = BoundedStack::new(2);
        assert_eq!(stack.push(1), None);
        assert_eq!(stack.push(2), None);
        assert_eq!(stack.push(3), Some(1));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.pop(), Some(2));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn typing_extends_after_range() {
        let mut history = UndoHistory::new(8, 4);
        open_run(&mut history, pos(2, 3));
        for (column, ch) in [(3, "a"), (4, "b"), (5, "c")] {
            assert!(history.record(&RunEdit::Insert {
                at: pos(2, column),
                text: ch,
            }));
        }
        let run = history.open_run().expect("run");
        assert_eq!((run.after.start, run.after.end), (pos(2, 3), pos(2, 6)));
        assert!(!history.accepts(&RunEdit::Insert {
            at: pos(2, 9),
            text: "x",
        }));
    }

    #[test]
    fn backspace_grows_before_text_backward() {
        let mut history = UndoHistory::new(8, 4);
        open_run(&mut history, pos(1, 5));
        assert!(history.record(&RunEdit::Delete {
            start: pos(1, 4),
            end: pos(1, 5),
            removed: "d",
        }));
        assert!(history.record(&RunEdit::Delete {
            start: pos(1, 3),
            end: pos(1, 4),
            removed: "c",
        }));
        let run = history.open_run().expect("run");
        assert_eq!(run.before.text.as_deref(), Some("cd"));
        assert!(run.before.is_end_before_start());
        assert_eq!(run.after, Selection::caret(pos(1, 3)));

        // Typing after backspacing must start a new unit.
        assert!(!history.accepts(&RunEdit::Insert {
            at: pos(1, 3),
            text: "x",
        }));
        history.finish_run(String::new(), pos(1, 3));
        let item = history.pop_undo().expect("item");
        assert_eq!((item.before.start, item.before.end), (pos(1, 3), pos(1, 5)));
    }

    #[test]
    fn forward_delete_appends_before_text() {
        let mut history = UndoHistory::new(8, 4);
        open_run(&mut history, pos(1, 2));
        for removed in ["x", "y"] {
            assert!(history.record(&RunEdit::Delete {
                start: pos(1, 2),
                end: pos(1, 3),
                removed,
            }));
        }
        let run = history.open_run().expect("run");
        assert_eq!(run.before.text.as_deref(), Some("xy"));
        assert_eq!(run.before.end, pos(1, 4));
    }

    #[test]
    fn empty_runs_are_dropped_and_new_edits_clear_redo() {
        let mut history = UndoHistory::new(8, 4);
        open_run(&mut history, pos(1, 1));
        history.finish_run(String::new(), pos(1, 1));
        assert_eq!(history.undo_len(), 0);

        history.push_redo(UndoItem::begin(Selection::caret(pos(1, 1)), pos(1, 1), false));
        open_run(&mut history, pos(1, 1));
        assert_eq!(history.redo_len(), 0);
    }
}
