// Duration scheduler
//
// Every process runs one scheduler: a periodic sweep that ends rooms
// past their duration budget, and a bus subscription that keeps the
// local tracking map consistent with duration changes made anywhere.

// Public API - what other modules can use
pub use service::{
    end_expired_rooms, handle_duration_event, DurationScheduler, SchedulerConfig, SchedulerHandle,
};
pub use tracker::{DurationTracker, TrackedRoom};

// Internal modules
mod service;
mod tracker;
