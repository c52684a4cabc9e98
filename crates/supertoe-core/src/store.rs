//! State store abstraction.

use async_trait::async_trait;

use crate::error::DomainError;

/// A stored snapshot together with the version it was saved at.
///
/// Versions start at 1 for the first save of a key and grow by one on every
/// later save. Version 0 stands for "nothing stored yet".
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    /// Version of this snapshot.
    pub version: i64,
    /// The serialized game.
    pub state: serde_json::Value,
}

/// Keyed storage for serialized game snapshots with optimistic concurrency.
///
/// Every server replica sharing a store goes through `save`'s version check,
/// so of two writers that loaded the same version only one can commit.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the most recently saved snapshot for `key`, or `None` if nothing
    /// has been saved yet.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StoreUnavailable` if the backend fails.
    async fn load(&self, key: &str) -> Result<Option<StoredSnapshot>, DomainError>;

    /// Store `state` under `key` if the stored version is still
    /// `expected_version` (0 when nothing was stored). Returns the new
    /// version.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if another writer saved
    /// first, or `DomainError::StoreUnavailable` if the backend fails.
    async fn save(
        &self,
        key: &str,
        expected_version: i64,
        state: &serde_json::Value,
    ) -> Result<i64, DomainError>;
}
