// Notification bus and event contracts
//
// The bus carries both user-facing notifications (join invitations, chat)
// and the duration-check events that keep every process's local duration
// tracking consistent.

// Public API - what other modules can use
pub use bus::NotificationBus;
pub use events::{
    DataMessage, DataMessageBody, Delivery, DurationEvent, DurationEventType, FanoutMessage,
    MessageFrom,
};

// Internal modules
mod bus;
mod events;
