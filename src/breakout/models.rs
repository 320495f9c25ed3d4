use serde::{Deserialize, Serialize};

/// A breakout room record as persisted in the per-parent hash.
///
/// The id is derived as `<parentRoomId>:<localId>` at creation time and
/// is globally unique within the parent's namespace. `duration` (minutes)
/// is the only field mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakoutRoom {
    #[serde(default)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: u64,
    pub users: Vec<BreakoutRoomUser>,
}

impl BreakoutRoom {
    /// Whether the user is on the fixed invite list decided at creation.
    pub fn is_invited(&self, user_id: &str) -> bool {
        self.users.iter().any(|u| u.id == user_id)
    }
}

/// An invited user. Membership is a closed list - not editable after
/// the room is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BreakoutRoomUser {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Room metadata blob owned by the Room Directory. This subsystem reads
/// the parent's metadata, derives child-room templates from it, and
/// writes back a small number of feature fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetadata {
    #[serde(default)]
    pub room_title: String,
    #[serde(default)]
    pub welcome_message: String,
    #[serde(default)]
    pub is_breakout_room: bool,
    #[serde(default)]
    pub features: RoomFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomFeatures {
    /// Duration budget in minutes; 0 means unlimited.
    #[serde(default)]
    pub room_duration: u64,
    #[serde(default)]
    pub allow_recording: bool,
    #[serde(default)]
    pub allow_rtmp: bool,
    #[serde(default)]
    pub breakout_room_features: BreakoutRoomFeatures,
    #[serde(default)]
    pub waiting_room_features: WaitingRoomFeatures,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutRoomFeatures {
    pub is_allow: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WaitingRoomFeatures {
    pub is_active: bool,
}

/// Participant metadata stored against the parent room's live registry.
/// Only the admin flag matters here; everything else passes through into
/// the join credential untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
