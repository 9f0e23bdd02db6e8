//! Keys and modifiers accepted by [`crate::Editor::handle_key`].

use crate::error::EditorError;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CONTROL = 1 << 1;
        const ALT = 1 << 2;
    }
}

/// Keys with editor behavior. Printable keys arrive as [`Key::Char`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Backspace,
    Delete,
    Enter,
    Tab,
    Char(char),
}

impl FromStr for Key {
    type Err = EditorError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            return Ok(Self::Char(ch));
        }
        let key = match name.to_ascii_lowercase().as_str() {
            "up" => Self::Up,
            "down" => Self::Down,
            "left" => Self::Left,
            "right" => Self::Right,
            "pageup" | "pgup" => Self::PageUp,
            "pagedown" | "pgdn" => Self::PageDown,
            "home" => Self::Home,
            "end" => Self::End,
            "backspace" | "back" => Self::Backspace,
            "delete" | "del" => Self::Delete,
            "enter" | "return" => Self::Enter,
            "tab" => Self::Tab,
            "space" => Self::Char(' '),
            "plus" => Self::Char('+'),
            _ => return Err(EditorError::UnknownKey(name.to_string())),
        };
        Ok(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("Space"),
            Self::Char(ch) => write!(f, "{}", ch),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Parse a chord such as `ctrl+shift+Left` or `shift+Tab`.
///
/// # Errors
/// Returns [`EditorError::UnknownKey`] for unrecognized modifier or key names.
pub fn parse_chord(chord: &str) -> Result<(Key, Modifiers), EditorError> {
    let chord = chord.trim();
    let (prefix, key_name) = match chord.rsplit_once('+') {
        Some((prefix, key)) if !key.is_empty() => (prefix, key),
        _ => ("", chord),
    };
    let mut modifiers = Modifiers::empty();
    for part in prefix.split('+').filter(|part| !part.is_empty()) {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "shift" => Modifiers::SHIFT,
            "ctrl" | "control" => Modifiers::CONTROL,
            "alt" => Modifiers::ALT,
            _ => return Err(EditorError::UnknownKey(chord.to_string())),
        };
    }
    Ok((key_name.parse()?, modifiers))
}

#[cfg(test)]
mod tests {
    use super::{parse_chord, Key, Modifiers};
    use crate::error::EditorError;

    #[test]
    fn parse_chord_accepts_modifier_combinations() {
        let cases = [
            ("Left", Key::Left, Modifiers::empty()),
            ("ctrl+shift+Left", Key::Left, Modifiers::CONTROL | Modifiers::SHIFT),
            ("shift+tab", Key::Tab, Modifiers::SHIFT),
            ("Ctrl+z", Key::Char('z'), Modifiers::CONTROL),
            ("space", Key::Char(' '), Modifiers::empty()),
            ("+", Key::Char('+'), Modifiers::empty()),
        ];
        for (chord, key, modifiers) in cases {
            assert_eq!(parse_chord(chord).expect(chord), (key, modifiers), "chord: {}", chord);
        }
    }

    #[test]
    fn parse_chord_rejects_unknown_names() {
        assert!(matches!(parse_chord("hyper+a"), Err(EditorError::UnknownKey(_))));
        assert!(matches!(parse_chord("F13"), Err(EditorError::UnknownKey(_))));
    }
}
