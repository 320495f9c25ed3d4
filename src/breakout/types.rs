use serde::{Deserialize, Serialize};

use super::models::BreakoutRoom;
use crate::shared::AppError;

/// Request payload for creating a batch of breakout rooms under a parent
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBreakoutRoomsRequest {
    pub room_id: String,
    pub requested_user_id: String,
    /// Duration budget in minutes applied to every created room.
    pub duration: u64,
    pub welcome_msg: String,
    pub rooms: Vec<BreakoutRoom>,
}

impl CreateBreakoutRoomsRequest {
    /// Rejects malformed requests before any mutation happens.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.room_id.is_empty() {
            return Err(AppError::Validation("room_id is required".to_string()));
        }
        if self.duration == 0 {
            return Err(AppError::Validation(
                "duration must be greater than zero".to_string(),
            ));
        }
        if self.welcome_msg.is_empty() {
            return Err(AppError::Validation("welcome_msg is required".to_string()));
        }
        if self.rooms.is_empty() {
            return Err(AppError::Validation(
                "at least one breakout room is required".to_string(),
            ));
        }
        for room in &self.rooms {
            if room.id.is_empty() {
                return Err(AppError::Validation(
                    "every breakout room needs an id".to_string(),
                ));
            }
            if room.title.is_empty() {
                return Err(AppError::Validation(
                    "every breakout room needs a title".to_string(),
                ));
            }
            if room.users.is_empty() {
                return Err(AppError::Validation(
                    "every breakout room needs at least one user".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Request payload for admitting an invited user into a breakout room
#[derive(Debug, Clone, Deserialize)]
pub struct JoinBreakoutRoomRequest {
    pub room_id: String,
    pub breakout_room_id: String,
    pub user_id: String,
}

impl JoinBreakoutRoomRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.room_id.is_empty() || self.breakout_room_id.is_empty() || self.user_id.is_empty() {
            return Err(AppError::Validation(
                "room_id, breakout_room_id and user_id are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request payload for listing a parent's breakout rooms
#[derive(Debug, Clone, Deserialize)]
pub struct GetBreakoutRoomsRequest {
    pub room_id: String,
}

/// Request payload for replacing a breakout room's duration budget.
/// The new value is absolute, not a delta.
#[derive(Debug, Clone, Deserialize)]
pub struct IncreaseDurationRequest {
    pub room_id: String,
    pub breakout_room_id: String,
    pub duration: u64,
}

impl IncreaseDurationRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.room_id.is_empty() || self.breakout_room_id.is_empty() {
            return Err(AppError::Validation(
                "room_id and breakout_room_id are required".to_string(),
            ));
        }
        if self.duration == 0 {
            return Err(AppError::Validation(
                "duration must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request payload for broadcasting a chat message to every active
/// breakout room under a parent
#[derive(Debug, Clone, Deserialize)]
pub struct SendBreakoutRoomMsgRequest {
    pub room_id: String,
    pub msg: String,
}

impl SendBreakoutRoomMsgRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.room_id.is_empty() {
            return Err(AppError::Validation("room_id is required".to_string()));
        }
        if self.msg.is_empty() {
            return Err(AppError::Validation("msg is required".to_string()));
        }
        Ok(())
    }
}

/// Request payload for ending a single breakout room
#[derive(Debug, Clone, Deserialize)]
pub struct EndBreakoutRoomRequest {
    pub room_id: String,
    pub breakout_room_id: String,
}

impl EndBreakoutRoomRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.room_id.is_empty() || self.breakout_room_id.is_empty() {
            return Err(AppError::Validation(
                "room_id and breakout_room_id are required".to_string(),
            ));
        }
        Ok(())
    }
}

/// Request payload for ending every breakout room under a parent
#[derive(Debug, Clone, Deserialize)]
pub struct EndBreakoutRoomsRequest {
    pub room_id: String,
}

/// Response carrying the join credential for an admitted user
#[derive(Debug, Serialize, Deserialize)]
pub struct JoinBreakoutRoomResponse {
    pub token: String,
}

/// Generic acknowledgement for operations with no payload to return
#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub status: String,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}
