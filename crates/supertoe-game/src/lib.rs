//! Super Tic-Tac-Toe: rules engine and game service.
//!
//! `domain` holds the pure state machine: move validation, line detection,
//! the active-board constraint and the cooldown gate. `application` wraps it
//! in a service that serializes access and keeps the external state store and
//! observers in step with every committed move.

pub mod application;
pub mod domain;
