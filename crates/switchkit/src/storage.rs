//! Storage adaptor capability contract.

use crate::error::Result;
use crate::types::{Switch, SwitchMetadata};
use async_trait::async_trait;

/// The pluggability seam between [`SwitchKit`](crate::SwitchKit) and a
/// concrete storage backend.
///
/// Exactly three operations; any implementor is substitutable. Adaptors own
/// whatever backend bookkeeping the contract hides (namespace resolution,
/// split value/metadata representations, authentication) and surface every
/// failure as a strict [`Result`](crate::Result); the caching client
/// decides which failures degrade to a soft outcome.
#[async_trait]
pub trait StorageAdaptor: Send + Sync {
    /// Prepare the backend for reads and writes.
    ///
    /// Must be idempotent: a second call after a successful first one is a
    /// no-op. A failed call must leave the adaptor usable for a retry.
    async fn init(&mut self) -> Result<()>;

    /// Fetch the switch stored under `key`.
    ///
    /// Returns `Ok(None)` when the backend positively reports the key as
    /// absent; errors are for failed lookups, not missing data.
    async fn get(&self, key: &str) -> Result<Option<Switch>>;

    /// Store `value` (and optional metadata) under `key`.
    ///
    /// `None` metadata is written as an empty mapping.
    async fn set(&self, key: &str, value: &str, metadata: Option<SwitchMetadata>) -> Result<()>;
}
