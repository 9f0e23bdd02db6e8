//! Debounced, cancellable line classification.
//!
//! Edits arm a debounce timer. When it fires the editor commits pending
//! text, snapshots the lines, and hands them to a [`Classifier`] either on a
//! worker thread or inline. Every pass and every edit bumps a shared
//! [`VersionStamp`]; results captured under an older version are dropped
//! instead of applied.

mod schedule;
mod token;
mod worker;

pub use schedule::{Debouncer, HighlightScheduler};
pub use token::{TokenClassifier, CLASS_IDENTIFIER, CLASS_NUMBER, CLASS_SYMBOL};

use crate::line_store::LineId;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// A colored run on one line. Columns are 1-based characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassifiedSpan {
    pub start_column: usize,
    pub len: usize,
    /// Opaque to the engine; forwarded to the renderer.
    pub class_id: u32,
}

/// Host-supplied line classifier.
pub trait Classifier: Send + Sync {
    /// Spans for one line, ordered by start column.
    fn classify_line(&self, text: &str) -> Vec<ClassifiedSpan>;

    /// Called once per pass with the full document text before any line.
    fn prepare(&self, _content: &str) {}
}

/// Monotonic document version shared with the worker.
#[derive(Clone, Debug, Default)]
pub struct VersionStamp(Arc<AtomicU64>);

impl VersionStamp {
    /// Increment and return the new version.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    pub fn is_current(&self, version: u64) -> bool {
        self.current() == version
    }
}

/// Snapshot of one line handed to a pass.
#[derive(Clone, Debug)]
pub struct LineSnapshot {
    pub id: LineId,
    pub text: String,
}

/// Input to one classification pass.
#[derive(Clone, Debug)]
pub struct HighlightRequest {
    pub version: u64,
    pub lines: Vec<LineSnapshot>,
    /// Lines committed by this pass; applied first.
    pub updated: Vec<LineId>,
}

/// Output of a completed pass.
#[derive(Clone, Debug)]
pub struct HighlightRender {
    pub version: u64,
    pub lines: Vec<(LineId, Vec<ClassifiedSpan>)>,
    pub updated: Vec<LineId>,
}

/// Emit a highlight lifecycle trace when tracing is enabled.
pub(crate) fn trace_highlight(enabled: bool, event: &str, details: &str) {
    if !enabled {
        return;
    }
    info!(
        target: "codepad_core::highlight",
        event = event,
        details = details,
        "highlight trace"
    );
}

/// Run one pass, checking for staleness every `check_interval` lines.
///
/// # Returns
/// `None` when a newer version appeared before the pass finished.
pub(crate) fn classify_request(
    classifier: &dyn Classifier,
    request: HighlightRequest,
    stamp: &VersionStamp,
    check_interval: usize,
) -> Option<HighlightRender> {
    let check_interval = check_interval.max(1);
    let version = request.version;
    let content = request
        .lines
        .iter()
        .map(|line| line.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    classifier.prepare(&content);

    let mut lines = Vec::with_capacity(request.lines.len());
    for (idx, line) in request.lines.into_iter().enumerate() {
        if idx % check_interval == 0 && !stamp.is_current(version) {
            return None;
        }
        let spans = classifier.classify_line(&line.text);
        lines.push((line.id, spans));
    }
    if !stamp.is_current(version) {
        return None;
    }
    Some(HighlightRender {
        version,
        lines,
        updated: request.updated,
    })
}

/// Split line indices into apply phases: edited lines, lines within
/// `radius` of an edited line, then everything else.
pub fn locality_phases(line_count: usize, edited: &[usize], radius: usize) -> [Vec<usize>; 3] {
    const UNSEEN: u8 = 0;
    let mut phase_of = vec![UNSEEN; line_count];
    let mut edited_phase = Vec::new();
    for &idx in edited {
        if idx < line_count && phase_of[idx] == UNSEEN {
            phase_of[idx] = 1;
            edited_phase.push(idx);
        }
    }
    let mut nearby = Vec::new();
    for &idx in &edited_phase {
        let low = idx.saturating_sub(radius);
        let high = idx.saturating_add(radius).min(line_count.saturating_sub(1));
        for near in low..=high {
            if phase_of[near] == UNSEEN {
                phase_of[near] = 2;
                nearby.push(near);
            }
        }
    }
    nearby.sort_unstable();
    let rest = (0..line_count)
        .filter(|idx| phase_of[*idx] == UNSEEN)
        .collect();
    [edited_phase, nearby, rest]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    struct BumpingClassifier {
        stamp: VersionStamp,
        calls: AtomicUsize,
        bump_at: usize,
    }

    impl Classifier for BumpingClassifier {
        fn classify_line(&self, _text: &str) -> Vec<ClassifiedSpan> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call == self.bump_at {
                self.stamp.bump();
            }
            Vec::new()
        }
    }

    fn request(version: u64, count: usize) -> HighlightRequest {
        let mut store = crate::line_store::LineStore::new();
        store.set_content(&"x\n".repeat(count));
        HighlightRequest {
            version,
            lines: store
                .lines()
                .iter()
                .map(|line| LineSnapshot {
                    id: line.id(),
                    text: line.text().to_string(),
                })
                .collect(),
            updated: Vec::new(),
        }
    }

    #[test]
    fn locality_phases_prioritize_edited_then_nearby() {
        let [edited, nearby, rest] = locality_phases(30, &[15, 15], 2);
        assert_eq!(edited, vec![15]);
        assert_eq!(nearby, vec![13, 14, 16, 17]);
        assert_eq!(rest.len(), 25);
        assert!(!rest.contains(&15));

        let [edited, nearby, rest] = locality_phases(3, &[0], 10);
        assert_eq!((edited, nearby, rest), (vec![0], vec![1, 2], vec![]));
    }

    #[test]
    fn pass_aborts_at_next_check_after_version_bump() {
        let stamp = VersionStamp::default();
        let version = stamp.bump();
        let classifier = BumpingClassifier {
            stamp: stamp.clone(),
            calls: AtomicUsize::new(0),
            bump_at: 5,
        };
        let render = classify_request(&classifier, request(version, 40), &stamp, 8);
        assert!(render.is_none());
        assert_eq!(classifier.calls.load(Ordering::SeqCst), 8);
    }

    #[test]
    fn pass_completes_when_version_is_stable() {
        let stamp = VersionStamp::default();
        let version = stamp.bump();
        let render = classify_request(&TokenClassifier, request(version, 3), &stamp, 128)
            .expect("render");
        assert_eq!(render.version, version);
        assert_eq!(render.lines.len(), 3);
    }
}
