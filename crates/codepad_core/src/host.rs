//! Collaborators the host provides to the editor.

use crate::error::EditorError;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// System clipboard access.
pub trait Clipboard: Send {
    fn set_text(&mut self, text: &str) -> Result<(), EditorError>;
    fn get_text(&mut self) -> Result<String, EditorError>;
}

/// Process-local clipboard. Clones share the same contents.
#[derive(Clone, Debug, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<String>>,
}

impl MemoryClipboard {
    pub fn new(text: &str) -> Self {
        Self {
            contents: Arc::new(Mutex::new(text.to_string())),
        }
    }

    pub fn contents(&self) -> String {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), EditorError> {
        let mut guard = self
            .contents
            .lock()
            .map_err(|_| EditorError::Clipboard("clipboard lock poisoned".to_string()))?;
        *guard = text.to_string();
        Ok(())
    }

    fn get_text(&mut self) -> Result<String, EditorError> {
        self.contents
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| EditorError::Clipboard("clipboard lock poisoned".to_string()))
    }
}

/// Time source for debounce deadlines.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(PoisonError::into_inner);
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        let start = clock.now();
        handle.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - start, Duration::from_millis(250));
    }

    #[test]
    fn memory_clipboard_clones_share_contents() {
        let clipboard = MemoryClipboard::new("seed");
        let mut writer = clipboard.clone();
        assert_eq!(writer.get_text().expect("read"), "seed");
        writer.set_text("copied").expect("write");
        assert_eq!(clipboard.contents(), "copied");
    }
}
