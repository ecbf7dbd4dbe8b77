//! Collaborator abstraction trait definitions

mod display_surface;
mod history_boundary;
mod object_store;

pub use display_surface::{DisplaySurface, TextMeasure};
pub use history_boundary::HistoryBoundary;
pub use object_store::ObjectStore;
