//! Super Tic-Tac-Toe HTTP and WebSocket server.
//!
//! Exposes the game service over JSON routes and pushes every committed
//! change to connected WebSocket clients.

pub mod broadcast;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
