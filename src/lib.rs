// Library crate for the breakout room coordination server
// This file exposes the public API for integration tests

pub mod breakout;
pub mod directory;
pub mod event;
pub mod scheduler;
pub mod session;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use breakout::{
    models::BreakoutRoom, repository::BreakoutStore, types::CreateBreakoutRoomsRequest,
    BreakoutRoomService,
};
pub use directory::RoomDirectory;
pub use event::{Delivery, DurationEvent, DurationEventType, FanoutMessage, NotificationBus};
pub use scheduler::{DurationScheduler, DurationTracker, SchedulerConfig};
pub use shared::{AppError, AppState};
