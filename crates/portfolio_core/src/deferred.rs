use std::time::{Duration, Instant};

pub const QUERY_DEBOUNCE: Duration = Duration::from_millis(200);

/// Search text that trails keystrokes by a quiet period.
///
/// `input` records what the user typed; `committed` only catches up once
/// `poll` observes that no new input arrived for the debounce window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredQuery {
    committed: String,
    pending: Option<PendingInput>,
    delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingInput {
    text: String,
    last_input: Instant,
}

impl Default for DeferredQuery {
    fn default() -> Self {
        Self::new(QUERY_DEBOUNCE)
    }
}

impl DeferredQuery {
    pub fn new(delay: Duration) -> Self {
        Self {
            committed: String::new(),
            pending: None,
            delay,
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    /// Text as typed, including input not yet committed.
    pub fn current(&self) -> &str {
        self.pending
            .as_ref()
            .map(|p| p.text.as_str())
            .unwrap_or(&self.committed)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn input(&mut self, text: String, at: Instant) {
        if self.pending.is_none() && text == self.committed {
            return;
        }
        self.pending = Some(PendingInput {
            text,
            last_input: at,
        });
    }

    /// Commits pending input whose quiet period has elapsed.
    /// Returns true when the committed text changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let ready = match &self.pending {
            Some(pending) => now.saturating_duration_since(pending.last_input) >= self.delay,
            None => false,
        };
        ready && self.flush()
    }

    /// Commits immediately, bypassing the quiet period.
    pub fn flush(&mut self) -> bool {
        match self.pending.take() {
            Some(pending) if pending.text != self.committed => {
                self.committed = pending.text;
                true
            }
            _ => false,
        }
    }
}
