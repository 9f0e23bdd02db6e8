//! Core line-editing engine for codepad (buffer, cursor, history, highlighting).

/// Bracket auto-pairing state.
pub mod braces;
/// Editor configuration loading and defaults.
pub mod config;
/// Shared defaults used across codepad crates.
pub mod constants;
/// Cursor movement and selection tracking.
pub mod cursor;
/// The editor facade tying all components together.
pub mod editor;
/// Engine error types.
pub mod error;
/// Change notifications published by the editor.
pub mod events;
/// Debounced background classification.
pub mod highlight;
/// Undo/redo history.
pub mod history;
/// Host collaborator interfaces (clipboard, clock).
pub mod host;
/// Key and modifier types for keyboard dispatch.
pub mod input;
/// Ordered line buffer.
pub mod line_store;
/// Two-point document ranges.
pub mod selection;
/// Column-based text helpers.
pub mod text;
/// Word boundary queries.
pub mod words;

pub use config::EditorConfig;
pub use cursor::MoveFlags;
pub use editor::Editor;
pub use error::EditorError;
pub use events::EditorEvent;
pub use highlight::{ClassifiedSpan, Classifier, TokenClassifier};
pub use host::{Clipboard, Clock, ManualClock, MemoryClipboard, SystemClock};
pub use input::{Key, Modifiers};
pub use line_store::{Line, LineId, LineStore};
pub use selection::{Position, Selection};
