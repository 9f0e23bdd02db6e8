//! Editor configuration loading from environment variables.

use crate::constants::{
    DEFAULT_HIGHLIGHT_DEBOUNCE_MS, DEFAULT_LOCALITY_RADIUS, DEFAULT_REDO_CAPACITY,
    DEFAULT_STALE_CHECK_INTERVAL, DEFAULT_TAB_WIDTH, DEFAULT_UNDO_CAPACITY, DEFAULT_VISIBLE_LINES,
    HIGHLIGHT_TRACE_ENV,
};
use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Runtime configuration for one [`crate::Editor`] instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub tab_width: usize,
    pub visible_lines: usize,
    pub undo_capacity: usize,
    pub redo_capacity: usize,
    pub highlight_debounce_ms: u64,
    pub locality_radius: usize,
    pub stale_check_interval: usize,
    pub auto_indent: bool,
    /// Classify on a worker thread. When `false`, passes run inline on the owner.
    pub background_highlight: bool,
    pub trace_highlight: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            visible_lines: DEFAULT_VISIBLE_LINES,
            undo_capacity: DEFAULT_UNDO_CAPACITY,
            redo_capacity: DEFAULT_REDO_CAPACITY,
            highlight_debounce_ms: DEFAULT_HIGHLIGHT_DEBOUNCE_MS,
            locality_radius: DEFAULT_LOCALITY_RADIUS,
            stale_check_interval: DEFAULT_STALE_CHECK_INTERVAL,
            auto_indent: false,
            background_highlight: true,
            trace_highlight: false,
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env_flag_or(name, false)
}

fn env_flag_or(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(default)
}

fn env_parse_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

impl EditorConfig {
    /// Load configuration from `CODEPAD_*` environment variables.
    ///
    /// # Returns
    /// A populated [`EditorConfig`] with defaults applied when env vars are
    /// missing or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tab_width: env_parse_or("CODEPAD_TAB_WIDTH", defaults.tab_width),
            visible_lines: env_parse_or("CODEPAD_VISIBLE_LINES", defaults.visible_lines),
            undo_capacity: env_parse_or("CODEPAD_UNDO_CAPACITY", defaults.undo_capacity),
            redo_capacity: env_parse_or("CODEPAD_REDO_CAPACITY", defaults.redo_capacity),
            highlight_debounce_ms: env_parse_or(
                "CODEPAD_HIGHLIGHT_DEBOUNCE_MS",
                defaults.highlight_debounce_ms,
            ),
            locality_radius: env_parse_or("CODEPAD_LOCALITY_RADIUS", defaults.locality_radius),
            stale_check_interval: env_parse_or(
                "CODEPAD_STALE_CHECK_INTERVAL",
                defaults.stale_check_interval,
            ),
            auto_indent: env_flag_or("CODEPAD_AUTO_INDENT", defaults.auto_indent),
            background_highlight: env_flag_or(
                "CODEPAD_BACKGROUND_HIGHLIGHT",
                defaults.background_highlight,
            ),
            trace_highlight: env_flag_enabled(HIGHLIGHT_TRACE_ENV),
        }
    }

    /// Reject values the engine cannot operate with.
    ///
    /// # Errors
    /// Returns [`EditorError::InvalidConfig`] naming the first offending field.
    pub fn validated(self) -> Result<Self, EditorError> {
        let checks = [
            ("tab_width", self.tab_width),
            ("visible_lines", self.visible_lines),
            ("undo_capacity", self.undo_capacity),
            ("redo_capacity", self.redo_capacity),
            ("stale_check_interval", self.stale_check_interval),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, value)| *value == 0) {
            return Err(EditorError::InvalidConfig(format!(
                "{} must be greater than zero",
                name
            )));
        }
        Ok(self)
    }

    pub fn highlight_debounce(&self) -> Duration {
        Duration::from_millis(self.highlight_debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_env_flag, EditorConfig};
    use crate::error::EditorError;

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = EditorConfig::default();
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.undo_capacity, 128);
        assert_eq!(config.redo_capacity, 32);
        assert_eq!(config.highlight_debounce().as_millis(), 300);
        assert_eq!(config.locality_radius, 10);
        assert!(!config.auto_indent);
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"tab_width": 2, "auto_indent": true}"#).expect("parse");
        assert_eq!(config.tab_width, 2);
        assert!(config.auto_indent);
        assert_eq!(config.undo_capacity, 128);
    }

    #[test]
    fn validated_rejects_zero_capacities() {
        let config = EditorConfig {
            undo_capacity: 0,
            ..EditorConfig::default()
        };
        match config.validated() {
            Err(EditorError::InvalidConfig(message)) => {
                assert!(message.contains("undo_capacity"), "message: {}", message)
            }
            other => panic!("expected invalid config, got {:?}", other),
        }
        assert!(EditorConfig::default().validated().is_ok());
    }
}
