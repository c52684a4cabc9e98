//! `PostgreSQL` implementation of the `StateStore` trait.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{instrument, warn};

use supertoe_core::error::DomainError;
use supertoe_core::store::{StateStore, StoredSnapshot};

/// PostgreSQL-backed state store. Expects the `game_states` table from the
/// workspace migrations.
///
/// Saves are compare-and-set on the `version` column: the first save inserts
/// with `ON CONFLICT DO NOTHING`, later saves update only the row still at
/// the expected version.
#[derive(Debug, Clone)]
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    /// Creates a new `PgStateStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn current_version(&self, key: &str) -> Result<i64, DomainError> {
        let version: Option<(i64,)> =
            sqlx::query_as("SELECT version FROM game_states WHERE game_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable(&e))?;

        Ok(version.map_or(0, |(v,)| v))
    }
}

fn unavailable(e: &sqlx::Error) -> DomainError {
    DomainError::StoreUnavailable(format!("database error: {e}"))
}

#[async_trait]
impl StateStore for PgStateStore {
    #[instrument(skip(self))]
    async fn load(&self, key: &str) -> Result<Option<StoredSnapshot>, DomainError> {
        let row: Option<(i64, Json<Value>)> =
            sqlx::query_as("SELECT version, state FROM game_states WHERE game_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| unavailable(&e))?;

        Ok(row.map(|(version, Json(state))| StoredSnapshot { version, state }))
    }

    #[instrument(skip(self, state))]
    async fn save(
        &self,
        key: &str,
        expected_version: i64,
        state: &Value,
    ) -> Result<i64, DomainError> {
        let result = if expected_version == 0 {
            sqlx::query(
                "INSERT INTO game_states (game_key, version, state, updated_at) \
                 VALUES ($1, 1, $2, now()) ON CONFLICT (game_key) DO NOTHING",
            )
            .bind(key)
            .bind(Json(state))
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE game_states SET version = version + 1, state = $3, updated_at = now() \
                 WHERE game_key = $1 AND version = $2",
            )
            .bind(key)
            .bind(expected_version)
            .bind(Json(state))
            .execute(&self.pool)
            .await
        }
        .map_err(|e| unavailable(&e))?;

        if result.rows_affected() == 0 {
            let actual = self.current_version(key).await?;
            warn!(expected_version, actual, "stale save rejected");
            return Err(DomainError::ConcurrencyConflict {
                key: key.to_owned(),
                expected: expected_version,
                actual,
            });
        }

        Ok(expected_version + 1)
    }
}
