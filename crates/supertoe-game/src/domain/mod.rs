//! Pure game model: no I/O, no locking.

pub mod board;
pub mod commands;
pub mod rejection;
pub mod state;
