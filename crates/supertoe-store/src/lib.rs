//! State store backends.
//!
//! `InMemoryStateStore` keeps snapshots in process memory and is the default
//! when no database is configured. `PgStateStore` keeps them in PostgreSQL so
//! several server replicas can share one game.

pub mod in_memory;
pub mod pg_state_store;

pub use in_memory::InMemoryStateStore;
pub use pg_state_store::PgStateStore;
