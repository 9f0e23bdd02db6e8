//! Error types for the editing engine.
use thiserror::Error;

/// Failures surfaced by the editor and its collaborators.
///
/// Document operations themselves never fail: out-of-range positions are
/// clamped. Errors only come from the host boundary and from setup.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Highlight worker error: {0}")]
    Worker(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown key: {0}")]
    UnknownKey(String),
}
