//! Shared defaults used across codepad crates.

/// Columns per indentation step.
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Lines covered by a page movement when the host has not reported a viewport.
pub const DEFAULT_VISIBLE_LINES: usize = 20;

/// Maximum retained undo items; the oldest entry is evicted first.
pub const DEFAULT_UNDO_CAPACITY: usize = 128;
/// Maximum retained redo items.
pub const DEFAULT_REDO_CAPACITY: usize = 32;

/// Idle time after the last edit before a highlight pass starts.
pub const DEFAULT_HIGHLIGHT_DEBOUNCE_MS: u64 = 300;

/// Lines around each edited line that are classified before the rest.
pub const DEFAULT_LOCALITY_RADIUS: usize = 10;

/// Number of lines a pass classifies between version checks.
pub const DEFAULT_STALE_CHECK_INTERVAL: usize = 128;

/// Env var that enables highlight pass tracing.
pub const HIGHLIGHT_TRACE_ENV: &str = "CODEPAD_HIGHLIGHT_TRACE";

/// Thread name used for the background classifier.
pub const HIGHLIGHT_WORKER_THREAD: &str = "codepad-highlight";

/// Opening/closing pairs inserted together when typed.
pub const DEFAULT_BRACE_PAIRS: &[(char, char)] = &[('(', ')'), ('[', ']'), ('{', '}')];
