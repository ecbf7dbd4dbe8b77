//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

/// Core layer error type
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Entity unknown to the object store
    #[error("Entity not found: {0}")]
    EntityNotFound(String),

    /// Field schema could not be loaded
    #[error("Schema unavailable for {entity}: {message}")]
    SchemaUnavailable { entity: String, message: String },

    /// Draft record for a create screen could not be provisioned
    #[error("Draft provisioning failed for {entity}: {message}")]
    DraftProvisioning { entity: String, message: String },

    /// Transport error talking to the object store
    #[error("Transport error: {0}")]
    Transport(String),

    /// Record is not a field mapping
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Record id already present in the collection
    #[error("Duplicate record: {0}")]
    DuplicateRecord(i64),

    /// Screen descriptor rejected
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// History entry was produced by another frame or page
    #[error("History entry mismatch: {0}")]
    HistoryMismatch(String),
}

impl CoreError {
    /// Whether it is expected behavior (bad input, unknown entity, foreign history entry),
    /// used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::EntityNotFound(_)
            | Self::InvalidRecord(_)
            | Self::DuplicateRecord(_)
            | Self::InvalidDescriptor(_)
            | Self::HistoryMismatch(_) => true,
            Self::SchemaUnavailable { .. }
            | Self::DraftProvisioning { .. }
            | Self::Transport(_)
            | Self::Serialization(_) => false,
        }
    }

    /// Log this error at the level chosen by [`CoreError::is_expected`].
    pub(crate) fn log(&self, context: &str) {
        if self.is_expected() {
            log::warn!("{context}: {self}");
        } else {
            log::error!("{context}: {self}");
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
