//! Notifications queued by the editor for the host.

use crate::line_store::LineId;
use serde::Serialize;

/// Change notification. Drained with [`crate::Editor::drain_events`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EditorEvent {
    /// Cursor moved; one event even when line and column both changed.
    CursorMoved { line: usize, column: usize },
    /// A line's text changed or the line was created.
    LineChanged { id: LineId, line: usize },
    LineCountChanged { count: usize },
    /// New classified spans were applied to a line.
    LineFormatted { id: LineId, line: usize },
}
