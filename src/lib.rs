//! Root crate facade: the codepad editing engine plus the script replay driver.

pub use codepad_core::*;

/// Headless script replay used by the `codepad` binary and integration tests.
pub mod replay;
