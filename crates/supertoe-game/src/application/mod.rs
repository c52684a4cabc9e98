//! Application layer: command/query handlers and the game service.

pub mod command_handlers;
pub mod query_handlers;
pub mod service;
