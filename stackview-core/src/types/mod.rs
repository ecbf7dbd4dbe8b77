//! Type definitions

mod descriptor;
mod domain;
mod record;
mod schema;

pub use descriptor::{
    HistoryState, Purpose, ScreenDescriptor, ScreenResult, ViewKind, ViewMode, HISTORY_MARKER,
};
pub use domain::{Clause, Condition, Domain, DEFAULT_OPERATORS, NON_DEFAULT_OPERANDS};
pub use record::{FetchPage, FetchRequest, FieldValues, Record, RecordId};
pub use schema::{EntitySchema, FieldDef, FieldKind, FieldType, NULL_MARKER};
