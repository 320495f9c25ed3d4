// Breakout room manager
//
// Creates, reads, mutates and tears down breakout rooms, using the
// coordination store as the cross-process source of truth and the
// notification bus for invitations, chat and duration events.

// Public API - what other modules can use
pub use handlers::{
    create_breakout_rooms, end_breakout_room, end_breakout_rooms, get_breakout_rooms,
    increase_breakout_room_duration, join_breakout_room, send_breakout_room_msg,
};
pub use service::BreakoutRoomService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
