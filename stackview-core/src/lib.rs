//! Stackview Core Library
//!
//! Client-side runtime for schema-driven admin screens, including:
//! - Collection model (record cache with field-level dirty tracking)
//! - Screen lifecycle
//! - Navigation stack (screen stacking, browser history reconciliation, breadcrumbs)
//!
//! This library is designed to be platform-independent. The object store, browser
//! history, display surface and text measurement are abstracted through traits.

pub mod context;
pub mod error;
pub mod model;
pub mod navigation;
pub mod screen;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use context::NavigationContext;
pub use error::{CoreError, CoreResult};
pub use model::{CollectionModel, ModelEvent};
pub use navigation::{
    Breadcrumb, Crumb, NavigationConfig, NavigationEvent, NavigationMode, NavigationStack,
    OpenedScreen, ReconcileOutcome,
};
pub use screen::{Screen, ScreenState};
pub use traits::{DisplaySurface, HistoryBoundary, ObjectStore, TextMeasure};
pub use utils::{Debouncer, IdGenerator, ScreenId};
