// Room Directory collaborator interface
//
// The directory is the authoritative store of room metadata and the
// active-room registry. This subsystem only consumes it; the production
// implementation lives behind this trait.

use async_trait::async_trait;

use crate::breakout::models::RoomMetadata;
use crate::shared::AppError;

pub use memory::InMemoryRoomDirectory;

mod memory;

/// Request for registering a child room with the directory
#[derive(Debug, Clone)]
pub struct DirectoryCreateRequest {
    pub room_id: String,
    pub metadata: RoomMetadata,
}

/// Directory verdict on a create request. `ok = false` with a message
/// means the directory rejected the room without a transport failure.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub ok: bool,
    pub message: String,
}

/// Participant entry in a parent room's live registry
#[derive(Debug, Clone)]
pub struct ParticipantInfo {
    pub name: String,
    /// Serialized UserMetadata blob, opaque to the directory.
    pub metadata: String,
}

/// Operations this subsystem consumes from the Room Directory
#[async_trait]
pub trait RoomDirectory {
    /// Loads the serialized metadata blob for a room. NotFound when the
    /// room is not active.
    async fn load_room_metadata(&self, room_id: &str) -> Result<String, AppError>;

    async fn update_room_metadata(&self, room_id: &str, metadata: String) -> Result<(), AppError>;

    async fn create_room(&self, request: &DirectoryCreateRequest)
        -> Result<CreateOutcome, AppError>;

    /// Ends an active room. Returns false when the room was not active,
    /// which callers on best-effort paths treat as already ended.
    async fn end_room(&self, room_id: &str) -> Result<bool, AppError>;

    async fn load_participant_metadata(
        &self,
        parent_room_id: &str,
        user_id: &str,
    ) -> Result<ParticipantInfo, AppError>;
}
