//! Server configuration read from the environment.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::AppError;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface to bind (`HOST`).
    pub host: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// PostgreSQL URL (`DATABASE_URL`); the in-memory store is used without it.
    pub database_url: Option<String>,
    /// Pool size for the PostgreSQL store (`DATABASE_MAX_CONNECTIONS`).
    pub database_max_connections: u32,
    /// Pause enforced after each successful move (`MOVE_COOLDOWN_SECONDS`).
    pub move_cooldown_seconds: u32,
    /// Key the game is stored under (`GAME_KEY`).
    pub game_key: String,
    /// Per-subscriber buffer of the broadcast channel (`BROADCAST_CAPACITY`).
    pub broadcast_capacity: usize,
    /// OTLP collector endpoint (`OTEL_EXPORTER_OTLP_ENDPOINT`).
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Reads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, applying defaults for anything
    /// unset or empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a value cannot be parsed or is out of
    /// range.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let broadcast_capacity = parse_or(&get, "BROADCAST_CAPACITY", 64usize)?;
        if broadcast_capacity == 0 {
            return Err(AppError::Config(
                "BROADCAST_CAPACITY must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse_or(&get, "PORT", 5000)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10)?,
            move_cooldown_seconds: parse_or(&get, "MOVE_COOLDOWN_SECONDS", 2)?,
            game_key: get("GAME_KEY").unwrap_or_else(|| "super-tic-tac-toe".to_owned()),
            broadcast_capacity,
            otlp_endpoint: get("OTEL_EXPORTER_OTLP_ENDPOINT"),
        })
    }

    /// The socket address to listen on.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `HOST:PORT` is not a valid address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} must be a valid number: {e}"))),
        None => Ok(default),
    }
}
