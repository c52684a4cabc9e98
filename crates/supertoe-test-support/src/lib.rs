//! Shared test mocks and utilities for the Super Tic-Tac-Toe server.

mod broadcast;
mod clock;
mod store;

pub use broadcast::RecordingBroadcaster;
pub use clock::{FixedClock, ManualClock};
pub use store::{
    EmptyStateStore, FailingSaveStateStore, FailingStateStore, RecordingStateStore,
    SlowLoadStateStore,
};
