//! Built-in classifier that tags identifier, number, and symbol runs.

use super::{ClassifiedSpan, Classifier};
use crate::words::CharClass;

pub const CLASS_IDENTIFIER: u32 = 1;
pub const CLASS_NUMBER: u32 = 2;
pub const CLASS_SYMBOL: u32 = 3;

/// Language-agnostic classifier used when the host supplies none.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokenClassifier;

impl Classifier for TokenClassifier {
    fn classify_line(&self, text: &str) -> Vec<ClassifiedSpan> {
        let mut spans = Vec::new();
        let mut run: Option<(CharClass, usize, String)> = None;
        for (idx, ch) in text.chars().enumerate() {
            let class = CharClass::of(ch);
            match run.as_mut() {
                Some((current, _, buf)) if *current == class => buf.push(ch),
                _ => {
                    if let Some(done) = run.take() {
                        push_span(&mut spans, done);
                    }
                    run = Some((class, idx + 1, ch.to_string()));
                }
            }
        }
        if let Some(done) = run {
            push_span(&mut spans, done);
        }
        spans
    }
}

fn push_span(spans: &mut Vec<ClassifiedSpan>, (class, start_column, text): (CharClass, usize, String)) {
    let class_id = match class {
        CharClass::Whitespace => return,
        CharClass::Word if text.chars().all(|ch| ch.is_ascii_digit()) => CLASS_NUMBER,
        CharClass::Word => CLASS_IDENTIFIER,
        CharClass::Symbol => CLASS_SYMBOL,
    };
    spans.push(ClassifiedSpan {
        start_column,
        len: text.chars().count(),
        class_id,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_runs_and_skips_whitespace() {
        let spans = TokenClassifier.classify_line("  if (x1 == 42);");
        let summary: Vec<(usize, usize, u32)> = spans
            .iter()
            .map(|span| (span.start_column, span.len, span.class_id))
            .collect();
        assert_eq!(
            summary,
            vec![
                (3, 2, CLASS_IDENTIFIER),
                (6, 1, CLASS_SYMBOL),
                (7, 2, CLASS_IDENTIFIER),
                (10, 2, CLASS_SYMBOL),
                (13, 2, CLASS_NUMBER),
                (15, 2, CLASS_SYMBOL),
            ]
        );
        assert!(TokenClassifier.classify_line("   ").is_empty());
    }
}
