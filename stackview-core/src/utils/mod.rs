//! Utility module

mod debounce;
mod ids;

pub use debounce::Debouncer;
pub use ids::{IdGenerator, ScreenId};
