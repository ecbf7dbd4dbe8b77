//! Session history with back/forward navigation

use std::sync::{Mutex, MutexGuard, PoisonError};

use stackview_core::types::HistoryState;
use stackview_core::HistoryBoundary;

#[derive(Default)]
struct Entries {
    states: Vec<HistoryState>,
    /// Index of the entry being displayed
    cursor: Option<usize>,
}

/// Linear browsing history: pushing drops every entry after the cursor.
///
/// `back` and `forward` return the entry the host should hand to
/// `NavigationStack::on_history_pop`.
#[derive(Default)]
pub struct SessionHistory {
    entries: Mutex<Entries>,
}

impl SessionHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move one entry back
    pub fn back(&self) -> Option<HistoryState> {
        let mut entries = self.lock();
        let cursor = entries.cursor?.checked_sub(1)?;
        entries.cursor = Some(cursor);
        entries.states.get(cursor).cloned()
    }

    /// Move one entry forward
    pub fn forward(&self) -> Option<HistoryState> {
        let mut entries = self.lock();
        let cursor = entries.cursor? + 1;
        let state = entries.states.get(cursor).cloned()?;
        entries.cursor = Some(cursor);
        Some(state)
    }

    /// Entry being displayed
    #[must_use]
    pub fn current(&self) -> Option<HistoryState> {
        let entries = self.lock();
        entries.cursor.and_then(|i| entries.states.get(i).cloned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().states.is_empty()
    }
}

impl HistoryBoundary for SessionHistory {
    fn push(&self, state: HistoryState) {
        let mut entries = self.lock();
        let keep = entries.cursor.map_or(0, |i| i + 1);
        entries.states.truncate(keep);
        entries.states.push(state);
        entries.cursor = Some(entries.states.len() - 1);
        log::debug!("History entry {} pushed", entries.states.len());
    }
}
