//! Browser history boundary Trait

use crate::types::HistoryState;

/// Receives one history entry per navigation stack mutation.
///
/// Pop notifications travel the other way: the host hands the popped
/// [`HistoryState`] to `NavigationStack::on_history_pop`.
pub trait HistoryBoundary: Send + Sync {
    /// Push a new history entry
    fn push(&self, state: HistoryState);
}
