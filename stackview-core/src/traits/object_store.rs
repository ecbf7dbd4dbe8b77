//! Remote object store abstract Trait

use async_trait::async_trait;

use crate::error::CoreResult;
use crate::types::{EntitySchema, FetchPage, FetchRequest, FieldValues, Record};

/// Remote object store Trait
///
/// Platform implementation:
/// - Browser host: JSON-RPC client against the admin backend
/// - Tests/demo: `InMemoryObjectStore` (stackview-app)
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the records matching a domain
    ///
    /// # Arguments
    /// * `request` - entity, projection, domain, view controller and extra parameters
    async fn fetch(&self, request: &FetchRequest) -> CoreResult<FetchPage>;

    /// Create a record and return it with its server-assigned id
    ///
    /// # Arguments
    /// * `entity` - entity name
    /// * `defaults` - initial field values
    async fn create(&self, entity: &str, defaults: &FieldValues) -> CoreResult<Record>;

    /// Field schema of an entity
    async fn schema(&self, entity: &str) -> CoreResult<EntitySchema>;
}
