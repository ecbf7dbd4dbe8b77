//! History reconciliation plan
//!
//! Both stacks are ordered sequences of screen projections. The plan keeps their
//! longest common prefix, closes the rest of the in-memory stack top-first and
//! opens the remainder of the popped stack in order.

use crate::types::ScreenDescriptor;

/// Minimal close/open edit script
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
    /// Length of the common prefix
    pub start: usize,
    /// Number of screens to close from the top
    pub close_count: usize,
    /// Descriptors to open, bottom first
    pub open: Vec<ScreenDescriptor>,
}

impl ReconcilePlan {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.close_count == 0 && self.open.is_empty()
    }
}

/// Compute the edit script turning `current` into `popped`
#[must_use]
pub fn plan(current: &[ScreenDescriptor], popped: &[ScreenDescriptor]) -> ReconcilePlan {
    let start = current
        .iter()
        .zip(popped)
        .take_while(|(ours, theirs)| ours == theirs)
        .count();

    ReconcilePlan {
        start,
        close_count: current.len() - start,
        open: popped[start..].to_vec(),
    }
}
