//! Domain error types.

use thiserror::Error;

/// Failures that abort an operation before any state is committed.
///
/// Game-rule rejections (moving too soon, illegal targets) are not errors;
/// they are reported as values by the game crate.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request could not be turned into a command.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Another writer saved the game between this operation's load and save.
    #[error("concurrency conflict on game {key}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The game key.
        key: String,
        /// The version the operation loaded.
        expected: i64,
        /// The version found in the store.
        actual: i64,
    },

    /// The state store failed to load or save, or returned undecodable data.
    #[error("state store unavailable: {0}")]
    StoreUnavailable(String),
}
