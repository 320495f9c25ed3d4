use std::sync::Arc;

use breakout_server::breakout::models::{
    BreakoutRoomFeatures, RoomFeatures, RoomMetadata,
};
use breakout_server::breakout::repository::InMemoryBreakoutStore;
use breakout_server::directory::{InMemoryRoomDirectory, ParticipantInfo};
use breakout_server::event::NotificationBus;
use breakout_server::scheduler::DurationTracker;
use breakout_server::session::JwtJoinTokenIssuer;
use breakout_server::BreakoutRoomService;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub fn parent_metadata() -> RoomMetadata {
    RoomMetadata {
        room_title: "Main room".to_string(),
        welcome_message: "hello".to_string(),
        is_breakout_room: false,
        features: RoomFeatures {
            room_duration: 90,
            allow_recording: true,
            allow_rtmp: true,
            breakout_room_features: BreakoutRoomFeatures {
                is_allow: true,
                is_active: false,
            },
            ..Default::default()
        },
    }
}

pub struct TestSetup {
    pub bus: NotificationBus,
    pub tracker: Arc<DurationTracker>,
    pub store: Arc<InMemoryBreakoutStore>,
    pub directory: Arc<InMemoryRoomDirectory>,
    pub issuer: Arc<JwtJoinTokenIssuer>,
    pub service: BreakoutRoomService,
}

pub struct TestSetupBuilder {
    parent_room_id: String,
    participants: Vec<(String, String, bool)>, // (user_id, name, is_admin)
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            parent_room_id: "room1".to_string(),
            participants: vec![],
        }
    }

    pub fn with_participant(mut self, user_id: &str, name: &str, is_admin: bool) -> Self {
        self.participants
            .push((user_id.to_string(), name.to_string(), is_admin));
        self
    }

    pub fn build(self) -> TestSetup {
        let bus = NotificationBus::new();
        let tracker = Arc::new(DurationTracker::new());
        let store = Arc::new(InMemoryBreakoutStore::new());
        let directory = Arc::new(InMemoryRoomDirectory::new(Arc::clone(&tracker), bus.clone()));
        let issuer = Arc::new(JwtJoinTokenIssuer::default());

        directory.insert_room(
            &self.parent_room_id,
            serde_json::to_string(&parent_metadata()).unwrap(),
        );
        for (user_id, name, is_admin) in &self.participants {
            directory.insert_participant(
                &self.parent_room_id,
                user_id,
                ParticipantInfo {
                    name: name.clone(),
                    metadata: format!(r#"{{"isAdmin":{}}}"#, is_admin),
                },
            );
        }

        let service = BreakoutRoomService::new(
            store.clone(),
            directory.clone(),
            issuer.clone(),
            bus.clone(),
        );

        TestSetup {
            bus,
            tracker,
            store,
            directory,
            issuer,
            service,
        }
    }
}

impl Default for TestSetupBuilder {
    fn default() -> Self {
        Self::new()
    }
}
