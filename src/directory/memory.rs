use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, instrument};

use super::{CreateOutcome, DirectoryCreateRequest, ParticipantInfo, RoomDirectory};
use crate::event::{DurationEvent, NotificationBus};
use crate::scheduler::DurationTracker;
use crate::shared::AppError;

/// In-memory Room Directory for development and testing.
///
/// Mirrors the side effects the production directory has: creating a
/// room with a duration budget registers it with this process's duration
/// tracker, and ending a room publishes the `delete` duration event so
/// every process drops its tracking entry.
pub struct InMemoryRoomDirectory {
    rooms: Mutex<HashMap<String, String>>,
    participants: Mutex<HashMap<String, ParticipantInfo>>,
    tracker: Arc<DurationTracker>,
    bus: NotificationBus,
}

impl InMemoryRoomDirectory {
    pub fn new(tracker: Arc<DurationTracker>, bus: NotificationBus) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            participants: Mutex::new(HashMap::new()),
            tracker,
            bus,
        }
    }

    /// Seeds an active room directly, bypassing duration tracking.
    /// Test setup helper for parent rooms that exist before the
    /// subsystem runs.
    pub fn insert_room(&self, room_id: &str, metadata: String) {
        self.rooms
            .lock()
            .unwrap()
            .insert(room_id.to_string(), metadata);
    }

    /// Seeds a participant into a parent room's live registry.
    pub fn insert_participant(&self, parent_room_id: &str, user_id: &str, info: ParticipantInfo) {
        self.participants
            .lock()
            .unwrap()
            .insert(participant_key(parent_room_id, user_id), info);
    }

    pub fn is_active(&self, room_id: &str) -> bool {
        self.rooms.lock().unwrap().contains_key(room_id)
    }
}

fn participant_key(parent_room_id: &str, user_id: &str) -> String {
    format!("{}:{}", parent_room_id, user_id)
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    #[instrument(skip(self))]
    async fn load_room_metadata(&self, room_id: &str) -> Result<String, AppError> {
        let rooms = self.rooms.lock().unwrap();
        rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("room {} is not active", room_id)))
    }

    #[instrument(skip(self, metadata))]
    async fn update_room_metadata(&self, room_id: &str, metadata: String) -> Result<(), AppError> {
        let mut rooms = self.rooms.lock().unwrap();
        match rooms.get_mut(room_id) {
            Some(existing) => {
                *existing = metadata;
                debug!(room_id = %room_id, "Room metadata updated");
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "room {} is not active",
                room_id
            ))),
        }
    }

    #[instrument(skip(self, request))]
    async fn create_room(
        &self,
        request: &DirectoryCreateRequest,
    ) -> Result<CreateOutcome, AppError> {
        let metadata = serde_json::to_string(&request.metadata)?;

        {
            let mut rooms = self.rooms.lock().unwrap();
            if rooms.contains_key(&request.room_id) {
                return Ok(CreateOutcome {
                    ok: false,
                    message: format!("room {} already exists", request.room_id),
                });
            }
            rooms.insert(request.room_id.clone(), metadata);
        }

        // Rooms with a duration budget are enforced by this process's sweep.
        let duration = request.metadata.features.room_duration;
        if duration > 0 {
            self.tracker
                .track(&request.room_id, Utc::now().timestamp(), duration)
                .await;
        }

        info!(room_id = %request.room_id, duration, "Room registered with directory");
        Ok(CreateOutcome {
            ok: true,
            message: "room created".to_string(),
        })
    }

    #[instrument(skip(self))]
    async fn end_room(&self, room_id: &str) -> Result<bool, AppError> {
        let removed = self.rooms.lock().unwrap().remove(room_id).is_some();
        if !removed {
            debug!(room_id = %room_id, "End requested for a room that is not active");
            return Ok(false);
        }

        // Tracking cleanup is decoupled: every process, this one included,
        // drops its entry when the delete event arrives.
        self.bus.publish_duration_event(DurationEvent::delete(room_id));

        info!(room_id = %room_id, "Room ended");
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn load_participant_metadata(
        &self,
        parent_room_id: &str,
        user_id: &str,
    ) -> Result<ParticipantInfo, AppError> {
        let participants = self.participants.lock().unwrap();
        participants
            .get(&participant_key(parent_room_id, user_id))
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "participant {} not found in room {}",
                    user_id, parent_room_id
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakout::models::{RoomFeatures, RoomMetadata};
    use crate::event::DurationEventType;

    fn directory_with_bus() -> (InMemoryRoomDirectory, Arc<DurationTracker>, NotificationBus) {
        let tracker = Arc::new(DurationTracker::new());
        let bus = NotificationBus::new();
        let directory = InMemoryRoomDirectory::new(Arc::clone(&tracker), bus.clone());
        (directory, tracker, bus)
    }

    fn metadata_with_duration(duration: u64) -> RoomMetadata {
        RoomMetadata {
            room_title: "Team A".to_string(),
            welcome_message: String::new(),
            is_breakout_room: true,
            features: RoomFeatures {
                room_duration: duration,
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_create_room_registers_tracking_entry() {
        let (directory, tracker, _bus) = directory_with_bus();

        let request = DirectoryCreateRequest {
            room_id: "room1:r1".to_string(),
            metadata: metadata_with_duration(30),
        };
        let outcome = directory.create_room(&request).await.unwrap();

        assert!(outcome.ok);
        assert!(directory.is_active("room1:r1"));
        assert!(tracker.is_tracked("room1:r1").await);
    }

    #[tokio::test]
    async fn test_create_room_without_duration_is_untracked() {
        let (directory, tracker, _bus) = directory_with_bus();

        let request = DirectoryCreateRequest {
            room_id: "room1:r1".to_string(),
            metadata: metadata_with_duration(0),
        };
        directory.create_room(&request).await.unwrap();

        assert!(!tracker.is_tracked("room1:r1").await);
    }

    #[tokio::test]
    async fn test_duplicate_create_is_rejected_not_an_error() {
        let (directory, _tracker, _bus) = directory_with_bus();

        let request = DirectoryCreateRequest {
            room_id: "room1:r1".to_string(),
            metadata: metadata_with_duration(30),
        };
        directory.create_room(&request).await.unwrap();
        let outcome = directory.create_room(&request).await.unwrap();

        assert!(!outcome.ok);
        assert!(outcome.message.contains("already exists"));
    }

    #[tokio::test]
    async fn test_end_room_publishes_delete_event() {
        let (directory, _tracker, bus) = directory_with_bus();
        let mut rx = bus.subscribe_duration_events();

        let request = DirectoryCreateRequest {
            room_id: "room1:r1".to_string(),
            metadata: metadata_with_duration(30),
        };
        directory.create_room(&request).await.unwrap();

        let ended = directory.end_room("room1:r1").await.unwrap();
        assert!(ended);
        assert!(!directory.is_active("room1:r1"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, DurationEventType::Delete);
        assert_eq!(event.room_id, "room1:r1");
    }

    #[tokio::test]
    async fn test_end_inactive_room_returns_false() {
        let (directory, _tracker, _bus) = directory_with_bus();
        let ended = directory.end_room("room1:r1").await.unwrap();
        assert!(!ended);
    }

    #[tokio::test]
    async fn test_participant_lookup() {
        let (directory, _tracker, _bus) = directory_with_bus();

        directory.insert_participant(
            "room1",
            "u1",
            ParticipantInfo {
                name: "Alice".to_string(),
                metadata: r#"{"isAdmin":true}"#.to_string(),
            },
        );

        let info = directory
            .load_participant_metadata("room1", "u1")
            .await
            .unwrap();
        assert_eq!(info.name, "Alice");

        let missing = directory.load_participant_metadata("room1", "u2").await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
