//! Super Tic-Tac-Toe Core: shared abstractions.
//!
//! This crate defines the traits and types the game crate and the server
//! depend on: time, errors, commands, state storage and broadcast. It
//! contains no infrastructure code.

pub mod broadcast;
pub mod clock;
pub mod command;
pub mod error;
pub mod store;
