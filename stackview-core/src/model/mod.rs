//! Per-screen data layer

mod collection;

pub use collection::{CollectionModel, ModelEvent};
