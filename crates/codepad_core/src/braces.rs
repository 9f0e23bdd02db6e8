//! Auto-closing bracket pairs scoped to one typing run.

use std::collections::HashMap;

/// Opening-to-closing pairs plus the closers still expected in this run.
///
/// With no registered pairs every query misses and the feature is inert.
#[derive(Clone, Debug, Default)]
pub struct BraceMatcher {
    pairs: HashMap<char, char>,
    expected: Vec<char>,
}

impl BraceMatcher {
    pub fn with_pairs(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        Self {
            pairs: pairs.into_iter().collect(),
            expected: Vec::new(),
        }
    }

    pub fn register(&mut self, open: char, close: char) {
        self.pairs.insert(open, close);
    }

    /// Closer registered for `open`.
    pub fn closer_for(&self, open: char) -> Option<char> {
        self.pairs.get(&open).copied()
    }

    /// The closer the next keystroke may type over.
    pub fn expected(&self) -> Option<char> {
        self.expected.last().copied()
    }

    pub fn push(&mut self, close: char) {
        self.expected.push(close);
    }

    pub fn pop(&mut self) -> Option<char> {
        self.expected.pop()
    }

    /// Pop only when the top of the stack is `close`.
    pub fn pop_if(&mut self, close: char) -> bool {
        if self.expected() == Some(close) {
            self.expected.pop();
            true
        } else {
            false
        }
    }

    pub fn clear(&mut self) {
        self.expected.clear();
    }

    pub fn depth(&self) -> usize {
        self.expected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::BraceMatcher;
    use crate::constants::DEFAULT_BRACE_PAIRS;

    #[test]
    fn empty_map_is_inert() {
        let braces = BraceMatcher::default();
        assert_eq!(braces.closer_for('('), None);
        assert_eq!(braces.expected(), None);
    }

    #[test]
    fn stack_tracks_nested_closers() {
        let mut braces = BraceMatcher::with_pairs(DEFAULT_BRACE_PAIRS.iter().copied());
        braces.push(')');
        braces.push(']');
        assert_eq!(braces.expected(), Some(']'));
        assert!(!braces.pop_if(')'));
        assert!(braces.pop_if(']'));
        assert_eq!(braces.expected(), Some(')'));
        braces.clear();
        assert_eq!(braces.depth(), 0);
    }
}
