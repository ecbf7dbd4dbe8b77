//! Navigation context - holds all collaborators

use std::sync::Arc;

use crate::traits::{DisplaySurface, HistoryBoundary, ObjectStore, TextMeasure};
use crate::utils::IdGenerator;

/// Navigation context - holds all dependencies
///
/// The platform layer creates this context and injects its own collaborator
/// implementations.
pub struct NavigationContext {
    /// Remote object store
    pub store: Arc<dyn ObjectStore>,
    /// Browser history boundary
    pub history: Arc<dyn HistoryBoundary>,
    /// Visible surface
    pub surface: Arc<dyn DisplaySurface>,
    /// Label width measurement
    pub measure: Arc<dyn TextMeasure>,
    /// Screen id source
    pub ids: Arc<IdGenerator>,
}

impl NavigationContext {
    /// Create the navigation context
    #[must_use]
    pub fn new(
        store: Arc<dyn ObjectStore>,
        history: Arc<dyn HistoryBoundary>,
        surface: Arc<dyn DisplaySurface>,
        measure: Arc<dyn TextMeasure>,
        ids: Arc<IdGenerator>,
    ) -> Self {
        Self {
            store,
            history,
            surface,
            measure,
            ids,
        }
    }
}
