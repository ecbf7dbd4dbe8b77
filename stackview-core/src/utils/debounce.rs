//! Debounce primitive
//!
//! Calls are coalesced: only the last value survives, and it becomes available
//! once `delay` has passed without another call.

use std::time::Duration;

use tokio::time::{sleep_until, Instant};

/// Last-call-wins debouncer
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a call, replacing any pending value and restarting the delay
    pub fn call(&mut self, value: T) {
        self.pending = Some((value, Instant::now() + self.delay));
    }

    /// Take the pending value if its delay has elapsed
    pub fn poll(&mut self) -> Option<T> {
        match &self.pending {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Wait for the pending value's deadline and take it
    pub async fn settle(&mut self) -> Option<T> {
        let deadline = self.pending.as_ref().map(|(_, deadline)| *deadline)?;
        sleep_until(deadline).await;
        self.pending.take().map(|(value, _)| value)
    }
}
