//! Document positions and two-point ranges.

use serde::{Deserialize, Serialize};

/// A 1-based `(line, column)` location.
///
/// Ordering is lexicographic: line first, column breaks ties.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position reached after writing `text` starting here.
    pub fn advance(self, text: &str) -> Self {
        text.chars().fold(self, |pos, ch| {
            if ch == '\n' {
                Self::new(pos.line + 1, 1)
            } else {
                Self::new(pos.line, pos.column + 1)
            }
        })
    }

    /// Where this position ends up after `text` is inserted at `at`.
    ///
    /// Positions before `at` are unaffected; a position equal to `at` is
    /// pushed to the end of the insertion.
    pub fn shifted_by_insert(self, at: Position, text: &str) -> Self {
        if self < at {
            return self;
        }
        let end = at.advance(text);
        if self.line == at.line {
            Self::new(end.line, end.column + (self.column - at.column))
        } else {
            Self::new(self.line + (end.line - at.line), self.column)
        }
    }

    /// Where this position ends up after `start..end` is removed.
    ///
    /// Positions inside the removed range collapse onto `start`.
    pub fn shifted_by_delete(self, start: Position, end: Position) -> Self {
        if self <= start {
            return self;
        }
        if self <= end {
            return start;
        }
        if self.line == end.line {
            Self::new(start.line, start.column + (self.column - end.column))
        } else {
            Self::new(self.line - (end.line - start.line), self.column)
        }
    }
}

/// A raw range between two positions plus an optional text snapshot.
///
/// `start` is where the range was anchored and `end` where it was extended
/// to, so `end` may precede `start`. Use [`Selection::ordered`] for a view
/// with `start <= end`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub start: Position,
    pub end: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Selection {
    pub fn new(start: Position, end: Position) -> Self {
        Self {
            start,
            end,
            text: None,
        }
    }

    /// Zero-width range at `at`.
    pub fn caret(at: Position) -> Self {
        Self::new(at, at)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Strictly `start < end`.
    pub fn is_start_before_end(&self) -> bool {
        self.start < self.end
    }

    /// Strictly `end < start`; the range was extended backward.
    pub fn is_end_before_start(&self) -> bool {
        self.end < self.start
    }

    /// Copy of this range with `start <= end`.
    pub fn ordered(&self) -> Self {
        let mut ordered = self.clone();
        ordered.normalize();
        ordered
    }

    /// Swap the endpoints in place when reversed.
    pub fn normalize(&mut self) {
        if self.is_end_before_start() {
            std::mem::swap(&mut self.start, &mut self.end);
        }
    }

    /// True when `pos` lies within the ordered range, endpoints included.
    pub fn contains(&self, pos: Position) -> bool {
        let (low, high) = if self.is_end_before_start() {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        };
        low <= pos && pos <= high
    }
}

#[cfg(test)]
mod tests {
    use super::{Position, Selection};

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn ordering_breaks_line_ties_by_column() {
        let reversed = Selection::new(pos(3, 9), pos(3, 2));
        assert!(reversed.is_end_before_start());
        assert!(!reversed.is_start_before_end());
        let ordered = reversed.ordered();
        assert_eq!((ordered.start, ordered.end), (pos(3, 2), pos(3, 9)));

        let caret = Selection::caret(pos(2, 2));
        assert!(!caret.is_end_before_start());
        assert!(!caret.is_start_before_end());
        assert!(caret.is_empty());
    }

    #[test]
    fn advance_tracks_newlines() {
        assert_eq!(pos(2, 5).advance("ab"), pos(2, 7));
        assert_eq!(pos(2, 5).advance("ab\ncd"), pos(3, 3));
        assert_eq!(pos(2, 5).advance("\n"), pos(3, 1));
    }

    #[test]
    fn insert_shift_moves_points_at_or_after_insertion() {
        let at = pos(4, 3);
        assert_eq!(pos(4, 2).shifted_by_insert(at, "xy"), pos(4, 2));
        assert_eq!(pos(4, 3).shifted_by_insert(at, "xy"), pos(4, 5));
        assert_eq!(pos(4, 6).shifted_by_insert(at, "x\ny"), pos(5, 5));
        assert_eq!(pos(6, 1).shifted_by_insert(at, "x\ny"), pos(7, 1));
    }

    #[test]
    fn delete_shift_collapses_points_inside_range() {
        let (start, end) = (pos(2, 4), pos(3, 2));
        assert_eq!(pos(2, 1).shifted_by_delete(start, end), pos(2, 1));
        assert_eq!(pos(2, 9).shifted_by_delete(start, end), start);
        assert_eq!(pos(3, 5).shifted_by_delete(start, end), pos(2, 7));
        assert_eq!(pos(5, 5).shifted_by_delete(start, end), pos(4, 5));
    }
}
