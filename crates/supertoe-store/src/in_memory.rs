//! In-process implementation of the `StateStore` trait.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use supertoe_core::error::DomainError;
use supertoe_core::store::{StateStore, StoredSnapshot};

/// Keeps snapshots in a map; contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    states: RwLock<HashMap<String, StoredSnapshot>>,
}

impl InMemoryStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn load(&self, key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(self.states.read().await.get(key).cloned())
    }

    async fn save(
        &self,
        key: &str,
        expected_version: i64,
        state: &Value,
    ) -> Result<i64, DomainError> {
        let mut states = self.states.write().await;
        let actual = states.get(key).map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                key: key.to_owned(),
                expected: expected_version,
                actual,
            });
        }

        let version = actual + 1;
        states.insert(
            key.to_owned(),
            StoredSnapshot {
                version,
                state: state.clone(),
            },
        );
        Ok(version)
    }
}
