//! Debounce timer and pass dispatch for the highlight pipeline.

use super::worker::{spawn_highlight_worker, HighlightWorker};
use super::{
    classify_request, trace_highlight, Classifier, HighlightRender, HighlightRequest,
    VersionStamp,
};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crossbeam_channel::RecvTimeoutError;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Restartable one-shot deadline.
///
/// Arming again replaces the pending deadline, so a burst of edits fires
/// once, `delay` after the last one.
#[derive(Clone, Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fire at most once per arming.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the deadline, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

enum Backend {
    Disabled,
    Inline(Arc<dyn Classifier>),
    Worker(HighlightWorker),
}

/// Owns the version stamp, the debounce timer, and the classifier backend.
pub struct HighlightScheduler {
    debouncer: Debouncer,
    stamp: VersionStamp,
    backend: Backend,
    ready: VecDeque<HighlightRender>,
    check_interval: usize,
    trace_enabled: bool,
}

impl HighlightScheduler {
    /// Scheduler that commits text but never classifies.
    pub fn disabled(config: &EditorConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.highlight_debounce()),
            stamp: VersionStamp::default(),
            backend: Backend::Disabled,
            ready: VecDeque::new(),
            check_interval: config.stale_check_interval,
            trace_enabled: config.trace_highlight,
        }
    }

    /// Classify on the owner thread during dispatch.
    pub fn inline(config: &EditorConfig, classifier: Arc<dyn Classifier>) -> Self {
        let mut scheduler = Self::disabled(config);
        scheduler.backend = Backend::Inline(classifier);
        scheduler
    }

    /// Classify on a dedicated worker thread.
    ///
    /// # Errors
    /// Returns [`EditorError::Worker`] when the thread cannot be spawned.
    pub fn background(
        config: &EditorConfig,
        classifier: Arc<dyn Classifier>,
    ) -> Result<Self, EditorError> {
        let mut scheduler = Self::disabled(config);
        let worker = spawn_highlight_worker(
            classifier,
            scheduler.stamp.clone(),
            scheduler.check_interval,
            scheduler.trace_enabled,
        )?;
        scheduler.backend = Backend::Worker(worker);
        Ok(scheduler)
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self.backend, Backend::Disabled)
    }

    pub fn trace_enabled(&self) -> bool {
        self.trace_enabled
    }

    pub fn current_version(&self) -> u64 {
        self.stamp.current()
    }

    pub fn is_current(&self, version: u64) -> bool {
        self.stamp.is_current(version)
    }

    /// Record an edit: restart the debounce and invalidate in-flight passes.
    pub fn note_edit(&mut self, now: Instant) {
        self.debouncer.arm(now);
        self.stamp.bump();
    }

    /// True once when the debounce deadline has passed.
    pub fn poll_debounce(&mut self, now: Instant) -> bool {
        self.debouncer.poll(now)
    }

    pub fn cancel_debounce(&mut self) {
        self.debouncer.cancel();
    }

    pub fn debounce_remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.remaining(now)
    }

    /// Claim a fresh version for a pass about to start.
    pub fn begin_pass(&mut self) -> u64 {
        self.stamp.bump()
    }

    /// Hand a snapshot to the backend.
    pub fn dispatch(&mut self, request: HighlightRequest) {
        let details = format!("version={} lines={}", request.version, request.lines.len());
        match &self.backend {
            Backend::Disabled => {}
            Backend::Inline(classifier) => {
                trace_highlight(self.trace_enabled, "dispatch", &details);
                match classify_request(classifier.as_ref(), request, &self.stamp, self.check_interval)
                {
                    Some(render) => self.ready.push_back(render),
                    None => trace_highlight(self.trace_enabled, "abort", &details),
                }
            }
            Backend::Worker(worker) => {
                trace_highlight(self.trace_enabled, "dispatch", &details);
                if worker.tx.send(request).is_err() {
                    tracing::warn!("highlight worker disconnected; dropping pass");
                }
            }
        }
    }

    /// Completed passes, oldest first, without blocking.
    pub fn collect(&mut self) -> Vec<HighlightRender> {
        if let Backend::Worker(worker) = &self.backend {
            self.ready.extend(worker.rx.try_iter());
        }
        self.ready.drain(..).collect()
    }

    /// Like [`Self::collect`], but waits up to `timeout` for a worker result
    /// when nothing is ready yet.
    pub fn collect_blocking(&mut self, timeout: Duration) -> Vec<HighlightRender> {
        if self.ready.is_empty() {
            if let Backend::Worker(worker) = &self.backend {
                match worker.rx.recv_timeout(timeout) {
                    Ok(render) => self.ready.push_back(render),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        tracing::warn!("highlight worker disconnected");
                    }
                }
            }
        }
        self.collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::TokenClassifier;

    #[test]
    fn debouncer_restart_replaces_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.arm(start);
        debouncer.arm(start + Duration::from_millis(200));
        assert!(!debouncer.poll(start + Duration::from_millis(300)));
        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(300)),
            Some(Duration::from_millis(200))
        );
        assert!(debouncer.poll(start + Duration::from_millis(500)));
        assert!(!debouncer.poll(start + Duration::from_millis(900)));
        assert_eq!(debouncer.remaining(start), None);
    }

    #[test]
    fn edits_invalidate_inline_results() {
        let config = EditorConfig::default();
        let mut scheduler = HighlightScheduler::inline(&config, Arc::new(TokenClassifier));
        let version = scheduler.begin_pass();
        scheduler.dispatch(HighlightRequest {
            version,
            lines: Vec::new(),
            updated: Vec::new(),
        });
        scheduler.note_edit(Instant::now());
        let renders = scheduler.collect();
        assert_eq!(renders.len(), 1);
        assert!(!scheduler.is_current(renders[0].version));
    }

    #[test]
    fn disabled_scheduler_produces_nothing() {
        let mut scheduler = HighlightScheduler::disabled(&EditorConfig::default());
        let version = scheduler.begin_pass();
        scheduler.dispatch(HighlightRequest {
            version,
            lines: Vec::new(),
            updated: Vec::new(),
        });
        assert!(scheduler.collect().is_empty());
        assert!(!scheduler.is_enabled());
    }
}
