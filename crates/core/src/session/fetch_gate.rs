use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::classification::domain::mood::Mood;

/// Debounces track fetches behind detected mood changes.
///
/// A fetch is issued only when the mood differs from the last mood that
/// actually triggered a fetch **and** no fetch is currently in flight.
/// A trigger skipped while a fetch is outstanding is dropped, not queued;
/// the next qualifying tick will fire instead.
pub struct FetchGate {
    last_fetched: Mutex<Option<Mood>>,
    in_flight: AtomicBool,
}

impl FetchGate {
    pub fn new() -> Self {
        Self {
            last_fetched: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Try to claim the gate for `mood`. On success the caller must issue
    /// exactly one fetch and call [`release`](Self::release) when it resolves.
    pub fn try_acquire(&self, mood: Mood) -> bool {
        let mut last = self.last_fetched.lock().unwrap();
        if *last == Some(mood) {
            return false;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        // Updated only when a fetch is actually issued, so a skipped
        // trigger can fire again later
        *last = Some(mood);
        true
    }

    /// Clear the in-flight flag after a fetch resolves, success or failure.
    pub fn release(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    pub fn last_fetched(&self) -> Option<Mood> {
        *self.last_fetched.lock().unwrap()
    }
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new()
    }
}
