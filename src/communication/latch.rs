//! One-shot completion latch.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::response::CommunicationResult;
use super::status::HtmlCode;

/// Slot that is filled exactly once and wakes every waiter when it is.
#[derive(Debug, Default)]
pub(crate) struct CompletionLatch {
    slot: Mutex<Option<CommunicationResult>>,
    ready: Condvar,
}

impl CompletionLatch {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Publishes the result. Returns false if one was already published,
    /// in which case the new value is discarded.
    pub(crate) fn complete(&self, result: CommunicationResult) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        *slot = Some(result);
        self.ready.notify_all();
        true
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Blocks until the result is published.
    pub(crate) fn wait(&self) -> CommunicationResult {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = self
            .ready
            .wait_while(slot, |slot| slot.is_none())
            .unwrap_or_else(PoisonError::into_inner);
        // wait_while only returns once the slot is filled
        slot.clone()
            .unwrap_or_else(|| CommunicationResult::status_only(HtmlCode::CustomDefaultError))
    }

    /// Blocks for at most `timeout`.
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Option<CommunicationResult> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        while slot.is_none() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            slot = self
                .ready
                .wait_timeout(slot, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        slot.clone()
    }
}
