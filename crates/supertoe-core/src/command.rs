//! Command abstractions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier tying a request to the log lines it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generates a new time-ordered correlation ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trait that all game commands implement.
pub trait Command: Send + Sync + fmt::Debug {
    /// Stable command name used in logs.
    const NAME: &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> CorrelationId;
}
