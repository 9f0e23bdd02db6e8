//! Background classification thread.

use super::{classify_request, Classifier, HighlightRender, HighlightRequest, VersionStamp};
use crate::constants::HIGHLIGHT_WORKER_THREAD;
use crate::error::EditorError;
use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::info;

/// Channel endpoints of a running worker.
///
/// Dropping the handle closes the request channel, which ends the thread.
pub(crate) struct HighlightWorker {
    pub(crate) tx: Sender<HighlightRequest>,
    pub(crate) rx: Receiver<HighlightRender>,
}

/// Spawn the classifier thread.
///
/// # Errors
/// Returns [`EditorError::Worker`] when the OS refuses the thread.
pub(crate) fn spawn_highlight_worker(
    classifier: Arc<dyn Classifier>,
    stamp: VersionStamp,
    check_interval: usize,
    trace_enabled: bool,
) -> Result<HighlightWorker, EditorError> {
    let (tx, rx_cmd) = crossbeam_channel::unbounded::<HighlightRequest>();
    let (tx_evt, rx_evt) = crossbeam_channel::unbounded();

    thread::Builder::new()
        .name(HIGHLIGHT_WORKER_THREAD.to_string())
        .spawn(move || {
            for req in rx_cmd.iter() {
                let mut latest = req;
                // Only the newest queued request can still be current.
                while let Ok(next) = rx_cmd.try_recv() {
                    latest = next;
                }
                let started = Instant::now();
                let version = latest.version;
                let line_count = latest.lines.len();
                let render = classify_request(classifier.as_ref(), latest, &stamp, check_interval);
                let completed = render.is_some();
                if let Some(render) = render {
                    if tx_evt.send(render).is_err() {
                        break;
                    }
                }
                if trace_enabled {
                    let elapsed_ms = started.elapsed().as_secs_f32() * 1000.0;
                    info!(
                        target: "codepad_core::highlight",
                        event = "worker_done",
                        version = version,
                        line_count = line_count,
                        completed = completed,
                        elapsed_ms = elapsed_ms,
                        "highlight worker pass"
                    );
                }
            }
        })?;

    Ok(HighlightWorker { tx, rx: rx_evt })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{LineSnapshot, TokenClassifier};
    use crate::line_store::LineStore;
    use std::time::Duration;

    fn request(stamp: &VersionStamp, text: &str) -> HighlightRequest {
        let mut store = LineStore::new();
        store.set_content(text);
        HighlightRequest {
            version: stamp.bump(),
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
    fn worker_returns_render_for_current_version() {
        let stamp = VersionStamp::default();
        let worker = spawn_highlight_worker(Arc::new(TokenClassifier), stamp.clone(), 128, false)
            .expect("spawn worker");
        let req = request(&stamp, "let x = 1;\n");
        let version = req.version;
        worker.tx.send(req).expect("send request");

        let render = worker
            .rx
            .recv_timeout(Duration::from_secs(2))
            .expect("render");
        assert_eq!(render.version, version);
        assert_eq!(render.lines.len(), 1);
        assert!(!render.lines[0].1.is_empty());
    }

    #[test]
    fn worker_drops_requests_superseded_before_they_run() {
        let stamp = VersionStamp::default();
        let worker = spawn_highlight_worker(Arc::new(TokenClassifier), stamp.clone(), 1, false)
            .expect("spawn worker");
        let stale = request(&stamp, "old\n");
        stamp.bump();
        worker.tx.send(stale).expect("send request");
        assert!(worker.rx.recv_timeout(Duration::from_millis(200)).is_err());
    }
}
