use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use breakout_server::directory::{
    CreateOutcome, DirectoryCreateRequest, InMemoryRoomDirectory, ParticipantInfo, RoomDirectory,
};
use breakout_server::shared::AppError;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Wraps the in-memory directory and records every end_room call, so
/// tests can assert how often the sweep tried to end a given room.
pub struct CountingDirectory {
    inner: Arc<InMemoryRoomDirectory>,
    end_calls: RwLock<Vec<String>>,
}

impl CountingDirectory {
    pub fn new(inner: Arc<InMemoryRoomDirectory>) -> Self {
        Self {
            inner,
            end_calls: RwLock::new(Vec::new()),
        }
    }

    pub fn inner(&self) -> &InMemoryRoomDirectory {
        &self.inner
    }

    pub async fn end_calls_for(&self, room_id: &str) -> usize {
        self.end_calls
            .read()
            .await
            .iter()
            .filter(|id| id.as_str() == room_id)
            .count()
    }
}

#[async_trait]
impl RoomDirectory for CountingDirectory {
    async fn load_room_metadata(&self, room_id: &str) -> Result<String, AppError> {
        self.inner.load_room_metadata(room_id).await
    }

    async fn update_room_metadata(&self, room_id: &str, metadata: String) -> Result<(), AppError> {
        self.inner.update_room_metadata(room_id, metadata).await
    }

    async fn create_room(
        &self,
        request: &DirectoryCreateRequest,
    ) -> Result<CreateOutcome, AppError> {
        self.inner.create_room(request).await
    }

    async fn end_room(&self, room_id: &str) -> Result<bool, AppError> {
        self.end_calls.write().await.push(room_id.to_string());
        self.inner.end_room(room_id).await
    }

    async fn load_participant_metadata(
        &self,
        parent_room_id: &str,
        user_id: &str,
    ) -> Result<ParticipantInfo, AppError> {
        self.inner
            .load_participant_metadata(parent_room_id, user_id)
            .await
    }
}
