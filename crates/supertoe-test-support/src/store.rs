//! Test stores: mock `StateStore` implementations for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use supertoe_core::error::DomainError;
use supertoe_core::store::{StateStore, StoredSnapshot};

/// A working single-slot store that also records every successful `save`.
///
/// `load` returns whatever was saved last (for any key), or the initial
/// snapshot given to [`RecordingStateStore::with_state`]. Saves check the
/// expected version like a real backend.
#[derive(Debug, Default)]
pub struct RecordingStateStore {
    current: Mutex<Option<StoredSnapshot>>,
    saved: Mutex<Vec<(String, Value)>>,
}

impl RecordingStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot` at version 1.
    #[must_use]
    pub fn with_state(snapshot: Value) -> Self {
        Self {
            current: Mutex::new(Some(StoredSnapshot {
                version: 1,
                state: snapshot,
            })),
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Returns every `(key, snapshot)` pair committed by `save`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_states(&self) -> Vec<(String, Value)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl StateStore for RecordingStateStore {
    async fn load(&self, _key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn save(
        &self,
        key: &str,
        expected_version: i64,
        state: &Value,
    ) -> Result<i64, DomainError> {
        let mut current = self.current.lock().unwrap();
        let actual = current.as_ref().map_or(0, |s| s.version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                key: key.to_owned(),
                expected: expected_version,
                actual,
            });
        }

        let version = actual + 1;
        *current = Some(StoredSnapshot {
            version,
            state: state.clone(),
        });
        self.saved
            .lock()
            .unwrap()
            .push((key.to_owned(), state.clone()));
        Ok(version)
    }
}

/// A store that never holds anything and silently discards saves.
#[derive(Debug)]
pub struct EmptyStateStore;

#[async_trait]
impl StateStore for EmptyStateStore {
    async fn load(&self, _key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(None)
    }

    async fn save(
        &self,
        _key: &str,
        expected_version: i64,
        _state: &Value,
    ) -> Result<i64, DomainError> {
        Ok(expected_version + 1)
    }
}

/// A store whose every call fails. Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingStateStore;

#[async_trait]
impl StateStore for FailingStateStore {
    async fn load(&self, _key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        Err(DomainError::StoreUnavailable("connection refused".into()))
    }

    async fn save(
        &self,
        _key: &str,
        _expected_version: i64,
        _state: &Value,
    ) -> Result<i64, DomainError> {
        Err(DomainError::StoreUnavailable("connection refused".into()))
    }
}

/// A store that loads as empty but fails every save, for checking that a
/// transition is not applied when it cannot be persisted.
#[derive(Debug)]
pub struct FailingSaveStateStore;

#[async_trait]
impl StateStore for FailingSaveStateStore {
    async fn load(&self, _key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        Ok(None)
    }

    async fn save(
        &self,
        _key: &str,
        _expected_version: i64,
        _state: &Value,
    ) -> Result<i64, DomainError> {
        Err(DomainError::StoreUnavailable("disk full".into()))
    }
}

/// Wraps a store and pauses after every `load`, widening the window between
/// load and save the way a network round trip would. Lets tests interleave
/// two server replicas deterministically.
#[derive(Debug)]
pub struct SlowLoadStateStore<S> {
    inner: S,
    delay: Duration,
}

impl<S> SlowLoadStateStore<S> {
    /// Wraps `inner`, sleeping `delay` after each load.
    #[must_use]
    pub fn new(inner: S, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<S: StateStore> StateStore for SlowLoadStateStore<S> {
    async fn load(&self, key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        let snapshot = self.inner.load(key).await?;
        tokio::time::sleep(self.delay).await;
        Ok(snapshot)
    }

    async fn save(
        &self,
        key: &str,
        expected_version: i64,
        state: &Value,
    ) -> Result<i64, DomainError> {
        self.inner.save(key, expected_version, state).await
    }
}
