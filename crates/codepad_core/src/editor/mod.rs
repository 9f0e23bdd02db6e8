//! The editor facade: owns the document and routes input through the
//! cursor, brace, history, and highlight components.
//!
//! All mutation happens on the thread that owns the [`Editor`]. Only
//! classification may run elsewhere, and its results are applied back here
//! in [`Editor::tick`] or [`Editor::wait_for_highlight`].

mod edit;
mod navigate;
mod undo;


use crate::braces::BraceMatcher;
use crate::config::EditorConfig;
use crate::cursor::{CursorController, MoveFlags};
use crate::error::EditorError;
use crate::events::EditorEvent;
use crate::highlight::{
    locality_phases, trace_highlight, ClassifiedSpan, Classifier, HighlightRender,
    HighlightRequest, HighlightScheduler, LineSnapshot,
};
use crate::history::UndoHistory;
use crate::host::{Clipboard, Clock, MemoryClipboard, SystemClock};
use crate::input::{Key, Modifiers};
use crate::line_store::{Line, LineId, LineStore};
use crate::selection::{Position, Selection};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::warn;

/// A single-caret line editor.
pub struct Editor {
    config: EditorConfig,
    lines: LineStore,
    cursor: CursorController,
    braces: BraceMatcher,
    history: UndoHistory,
    highlight: HighlightScheduler,
    clipboard: Box<dyn Clipboard>,
    clock: Arc<dyn Clock>,
    events: Vec<EditorEvent>,
    visible_lines: usize,
    reported_line_count: usize,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Editor with an empty document and highlighting disabled.
    pub fn new(config: EditorConfig) -> Self {
        let mut lines = LineStore::new();
        let mut cursor = CursorController::default();
        cursor.reset(&mut lines);
        Self {
            history: UndoHistory::new(config.undo_capacity, config.redo_capacity),
            highlight: HighlightScheduler::disabled(&config),
            visible_lines: config.visible_lines.max(1),
            reported_line_count: lines.line_count(),
            config,
            lines,
            cursor,
            braces: BraceMatcher::default(),
            clipboard: Box::new(MemoryClipboard::default()),
            clock: Arc::new(SystemClock),
            events: Vec::new(),
        }
    }

    /// Enable highlighting with `classifier`.
    ///
    /// Runs on a worker thread when `background_highlight` is set, otherwise
    /// inline on the owner during [`Self::tick`].
    ///
    /// # Errors
    /// Returns [`EditorError::Worker`] when the worker thread cannot start.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Result<Self, EditorError> {
        self.highlight = if self.config.background_highlight {
            HighlightScheduler::background(&self.config, classifier)?
        } else {
            HighlightScheduler::inline(&self.config, classifier)
        };
        Ok(self)
    }

    pub fn with_clipboard(mut self, clipboard: Box<dyn Clipboard>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_brace_pairs(mut self, pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        self.braces = BraceMatcher::with_pairs(pairs);
        self
    }

    pub fn register_brace_pair(&mut self, open: char, close: char) {
        self.braces.register(open, close);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn lines(&self) -> &LineStore {
        &self.lines
    }

    pub fn line(&self, number: usize) -> Option<&Line> {
        self.lines.line(number)
    }

    pub fn line_count(&self) -> usize {
        self.lines.line_count()
    }

    pub fn cursor(&self) -> Position {
        self.cursor.position()
    }

    pub fn cursor_line(&self) -> usize {
        self.cursor.position().line
    }

    pub fn cursor_column(&self) -> usize {
        self.cursor.position().column
    }

    pub fn virtual_column(&self) -> Option<usize> {
        self.cursor.virtual_column()
    }

    /// Raw selection (anchor to cursor), if one is active.
    pub fn selection(&self) -> Option<Selection> {
        self.cursor.selection()
    }

    pub fn has_selection(&self) -> bool {
        self.cursor.has_selection()
    }

    /// Closer the next keystroke would type over.
    pub fn expected_closer(&self) -> Option<char> {
        self.braces.expected()
    }

    pub fn can_undo(&self) -> bool {
        self.history.undo_len() > 0 || self.history.is_run_open()
    }

    pub fn can_redo(&self) -> bool {
        self.history.redo_len() > 0
    }

    /// Current document version; increases on every edit and pass.
    pub fn version(&self) -> u64 {
        self.highlight.current_version()
    }

    pub fn visible_lines(&self) -> usize {
        self.visible_lines
    }

    /// Lines per page for PageUp/PageDown.
    pub fn set_visible_lines(&mut self, count: usize) {
        self.visible_lines = count.max(1);
    }

    /// Replace the document and reset cursor, history, and brace state.
    pub fn set_content(&mut self, text: &str) {
        self.lines.set_content(text);
        self.cursor.reset(&mut self.lines);
        self.braces.clear();
        self.history.clear();
        self.events.push(EditorEvent::CursorMoved { line: 1, column: 1 });
        let all = self.lines.lines().iter().map(|line| line.id()).collect();
        self.run_pass(all);
    }

    /// Document text, every line newline-terminated.
    pub fn content(&self) -> String {
        self.lines.content()
    }

    /// Move the cursor to the clamped `(line, column)`.
    ///
    /// Any move without [`MoveFlags::TYPING`] closes the open typing run
    /// and forgets pending auto-closed braces.
    pub fn move_cursor_to(&mut self, line: usize, column: usize, flags: MoveFlags) {
        if !flags.contains(MoveFlags::TYPING) {
            self.end_typing_undo();
            self.braces.clear();
        }
        let moved = self.cursor.move_to(&mut self.lines, line, column, flags);
        if moved.changed() {
            self.events.push(EditorEvent::CursorMoved {
                line: moved.to.line,
                column: moved.to.column,
            });
        }
    }

    fn move_to_pos(&mut self, pos: Position, flags: MoveFlags) {
        self.move_cursor_to(pos.line, pos.column, flags);
    }

    /// Dispatch one key press.
    ///
    /// # Returns
    /// `false` for chords the editor does not handle.
    pub fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        let ctrl = modifiers.contains(Modifiers::CONTROL);
        let shift = modifiers.contains(Modifiers::SHIFT);
        let select = if shift {
            MoveFlags::HIGHLIGHTING
        } else {
            MoveFlags::NONE
        };
        match key {
            Key::Up => self.move_up(select),
            Key::Down => self.move_down(select),
            Key::Left => self.move_left(select, ctrl),
            Key::Right => self.move_right(select, ctrl),
            Key::PageUp => self.page_up(select),
            Key::PageDown => self.page_down(select),
            Key::Home => self.move_home(select, ctrl),
            Key::End => self.move_end(select, ctrl),
            Key::Backspace => self.handle_backspace(),
            Key::Delete => self.handle_delete(),
            Key::Enter => self.handle_enter(),
            Key::Tab => self.handle_tab(shift),
            Key::Char(ch) if ctrl => return self.handle_shortcut(ch),
            Key::Char(ch) => self.handle_character(ch),
        }
        true
    }

    fn handle_shortcut(&mut self, ch: char) -> bool {
        match ch.to_ascii_lowercase() {
            'a' => self.select_all(),
            'c' => {
                if let Err(err) = self.copy_selection() {
                    warn!("copy failed: {}", err);
                }
            }
            'x' => {
                if let Err(err) = self.cut_selection() {
                    warn!("cut failed: {}", err);
                }
            }
            'v' => {
                if let Err(err) = self.paste() {
                    warn!("paste failed: {}", err);
                }
            }
            'z' => {
                self.undo();
            }
            'y' => {
                self.redo();
            }
            _ => return false,
        }
        true
    }

    /// Queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<EditorEvent> {
        self.publish_line_changes();
        std::mem::take(&mut self.events)
    }

    fn publish_line_changes(&mut self) {
        let changed = self.lines.take_changed();
        if changed.len() <= 4 {
            for id in changed {
                if let Some(idx) = self.lines.index_of(id) {
                    self.events.push(EditorEvent::LineChanged { id, line: idx + 1 });
                }
            }
        } else {
            let index = self.line_index();
            for id in changed {
                if let Some(idx) = index.get(&id) {
                    self.events.push(EditorEvent::LineChanged {
                        id,
                        line: idx + 1,
                    });
                }
            }
        }
        let count = self.lines.line_count();
        if count != self.reported_line_count {
            self.reported_line_count = count;
            self.events.push(EditorEvent::LineCountChanged { count });
        }
    }

    fn line_index(&self) -> HashMap<LineId, usize> {
        self.lines
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| (line.id(), idx))
            .collect()
    }

    /// Restart the idle timer after a keystroke-level edit.
    fn note_edit(&mut self) {
        let now = self.clock.now();
        self.highlight.note_edit(now);
    }

    /// Commit pending text and start a highlight pass now.
    pub fn refresh(&mut self) {
        let updated = self.lines.commit_pending();
        self.run_pass(updated);
    }

    /// Close any typing run and refresh without waiting for the debounce.
    pub fn flush(&mut self) {
        self.end_typing_undo();
        self.refresh();
    }

    fn run_pass(&mut self, updated: Vec<LineId>) {
        self.highlight.cancel_debounce();
        let version = self.highlight.begin_pass();
        if !self.highlight.is_enabled() {
            return;
        }
        let lines = self
            .lines
            .lines()
            .iter()
            .map(|line| LineSnapshot {
                id: line.id(),
                text: line.text().to_string(),
            })
            .collect();
        self.highlight.dispatch(HighlightRequest {
            version,
            lines,
            updated,
        });
    }

    /// Drive timers and apply finished highlight passes.
    ///
    /// Hosts call this from their event loop. When the debounce deadline
    /// has passed, the open typing run is closed and a pass starts.
    ///
    /// # Returns
    /// Number of lines that received new spans.
    pub fn tick(&mut self) -> usize {
        let now = self.clock.now();
        if self.highlight.poll_debounce(now) {
            self.end_typing_undo();
            self.refresh();
        }
        let renders = self.highlight.collect();
        self.apply_renders(renders)
    }

    /// How long the host may sleep before the next [`Self::tick`] matters.
    pub fn next_tick_in(&self) -> Option<Duration> {
        self.highlight.debounce_remaining(self.clock.now())
    }

    /// Block up to `timeout` for a current background pass, then apply it.
    ///
    /// Stale results that arrive first are dropped and waiting continues.
    pub fn wait_for_highlight(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            let renders = self.highlight.collect_blocking(remaining);
            let received = !renders.is_empty();
            let applied = self.apply_renders(renders);
            if applied > 0 || !received || remaining.is_zero() {
                return applied;
            }
        }
    }

    fn apply_renders(&mut self, renders: Vec<HighlightRender>) -> usize {
        let trace = self.highlight.trace_enabled();
        let mut applied = 0;
        for render in renders {
            if !self.highlight.is_current(render.version) {
                trace_highlight(
                    trace,
                    "drop_stale",
                    &format!(
                        "version={} current={}",
                        render.version,
                        self.highlight.current_version()
                    ),
                );
                continue;
            }
            applied += self.apply_render(render);
        }
        applied
    }

    /// Apply spans edited-lines-first, then nearby lines, then the rest.
    fn apply_render(&mut self, render: HighlightRender) -> usize {
        let HighlightRender {
            version,
            lines,
            updated,
        } = render;
        let trace = self.highlight.trace_enabled();
        let index = self.line_index();
        let edited: Vec<usize> = updated
            .iter()
            .filter_map(|id| index.get(id).copied())
            .collect();
        let mut spans: HashMap<LineId, Vec<ClassifiedSpan>> = lines.into_iter().collect();
        let phases = locality_phases(
            self.lines.line_count(),
            &edited,
            self.config.locality_radius,
        );

        let mut applied = 0;
        for (phase, indices) in phases.iter().enumerate() {
            if !self.highlight.is_current(version) {
                trace_highlight(trace, "abort", &format!("version={} phase={}", version, phase));
                break;
            }
            for &idx in indices {
                let Some(line) = self.lines.line_at_index_mut(idx) else {
                    continue;
                };
                let id = line.id();
                if let Some(line_spans) = spans.remove(&id) {
                    line.set_spans(line_spans);
                    self.events.push(EditorEvent::LineFormatted { id, line: idx + 1 });
                    applied += 1;
                }
            }
        }
        trace_highlight(
            trace,
            "apply",
            &format!("version={} lines={} edited={}", version, applied, edited.len()),
        );
        applied
    }
}
