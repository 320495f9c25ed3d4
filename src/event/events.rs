use serde::{Deserialize, Serialize};

/// Cross-process synchronization events for the room duration trackers.
///
/// These are transient bus messages, never persisted. Every process
/// subscribes; a process that does not track the named room treats the
/// event as a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DurationEventType {
    /// The room was ended somewhere; stop tracking it.
    #[serde(rename = "delete")]
    Delete,
    /// The room's duration budget was replaced with a new absolute value.
    #[serde(rename = "increaseDuration")]
    IncreaseDuration,
}

/// Payload carried on the duration-checker topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DurationEvent {
    #[serde(rename = "type")]
    pub event_type: DurationEventType,
    pub room_id: String,
    /// Absolute new duration in minutes, not a delta. Unused for `delete`.
    pub duration: u64,
}

impl DurationEvent {
    pub fn delete(room_id: impl Into<String>) -> Self {
        Self {
            event_type: DurationEventType::Delete,
            room_id: room_id.into(),
            duration: 0,
        }
    }

    pub fn increase_duration(room_id: impl Into<String>, duration: u64) -> Self {
        Self {
            event_type: DurationEventType::IncreaseDuration,
            room_id: room_id.into(),
            duration,
        }
    }
}

/// Delivery target for a user-facing notification.
///
/// A tagged union rather than an always-present-but-sometimes-empty
/// `to` field: broadcast goes to every connection in the room, unicast
/// to the one user's owning connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Broadcast,
    Unicast { to: String },
}

/// Envelope published on the websocket-fanout topic. The websocket layer
/// that owns the target connection consumes these and delivers them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FanoutMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub room_id: String,
    pub is_admin: bool,
    pub payload: DataMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataMessage {
    /// Message class: "SYSTEM" or "USER".
    #[serde(rename = "type")]
    pub message_type: String,
    pub room_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    pub body: DataMessageBody,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataMessageBody {
    /// Event name, e.g. "JOIN_BREAKOUT_ROOM" or "CHAT".
    #[serde(rename = "type")]
    pub event: String,
    pub from: MessageFrom,
    pub msg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageFrom {
    pub user_id: String,
}

impl FanoutMessage {
    /// Builds a notification envelope for a room. `delivery` decides
    /// whether the websocket layer broadcasts or unicasts.
    pub fn notification(
        room_id: &str,
        from_user_id: &str,
        delivery: Delivery,
        message_type: &str,
        event: &str,
        msg: &str,
        is_admin: bool,
    ) -> Self {
        let to = match delivery {
            Delivery::Broadcast => None,
            Delivery::Unicast { to } => Some(to),
        };

        Self {
            message_type: "sendMsg".to_string(),
            room_id: room_id.to_string(),
            is_admin,
            payload: DataMessage {
                message_type: message_type.to_string(),
                room_id: room_id.to_string(),
                to,
                body: DataMessageBody {
                    event: event.to_string(),
                    from: MessageFrom {
                        user_id: from_user_id.to_string(),
                    },
                    msg: msg.to_string(),
                },
            },
        }
    }
}
