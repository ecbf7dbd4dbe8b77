//! In-memory adapters for the navigation collaborators.
//!
//! Enough to drive a `NavigationStack` outside a browser: the demo binary and
//! the integration tests run on them.

mod cell_width;
mod log_surface;
mod memory_store;
mod session_history;

pub use cell_width::CellWidthMeasure;
pub use log_surface::LogSurface;
pub use memory_store::InMemoryObjectStore;
pub use session_history::SessionHistory;
