mod utils;

use breakout_server::breakout::models::{BreakoutRoom, BreakoutRoomUser, RoomMetadata};
use breakout_server::breakout::types::{
    CreateBreakoutRoomsRequest, EndBreakoutRoomRequest, IncreaseDurationRequest,
    JoinBreakoutRoomRequest, SendBreakoutRoomMsgRequest,
};
use breakout_server::shared::AppError;
use breakout_server::{BreakoutStore, DurationEventType, RoomDirectory};

use utils::TestSetupBuilder;

fn create_request() -> CreateBreakoutRoomsRequest {
    CreateBreakoutRoomsRequest {
        room_id: "room1".to_string(),
        requested_user_id: "user42".to_string(),
        duration: 30,
        welcome_msg: "welcome".to_string(),
        rooms: vec![BreakoutRoom {
            id: "r1".to_string(),
            title: "Team A".to_string(),
            duration: 0,
            users: vec![
                BreakoutRoomUser {
                    id: "u1".to_string(),
                    name: "Alice".to_string(),
                },
                BreakoutRoomUser {
                    id: "u2".to_string(),
                    name: "Bob".to_string(),
                },
            ],
        }],
    }
}

#[tokio::test]
async fn test_create_scenario_persists_record_and_invites_users() {
    let setup = TestSetupBuilder::new().build();
    let mut fanout = setup.bus.subscribe_fanout();

    setup
        .service
        .create_breakout_rooms(create_request())
        .await
        .unwrap();

    // Persisted record lives at hash key "room1", field "room1:r1"
    let records = setup.store.get_all_rooms("room1").await.unwrap();
    let record: BreakoutRoom = serde_json::from_str(records.get("room1:r1").unwrap()).unwrap();
    assert_eq!(record.duration, 30);
    let user_ids: Vec<&str> = record.users.iter().map(|u| u.id.as_str()).collect();
    assert_eq!(user_ids, vec!["u1", "u2"]);

    // u1 receives a JOIN_BREAKOUT_ROOM notification targeted at u1
    let invite = fanout.recv().await.unwrap();
    assert_eq!(invite.payload.body.event, "JOIN_BREAKOUT_ROOM");
    assert_eq!(invite.payload.to.as_deref(), Some("u1"));
    assert_eq!(invite.payload.body.from.user_id, "user42");

    // Parent flips breakout features to active
    let raw = setup.directory.load_room_metadata("room1").await.unwrap();
    let parent: RoomMetadata = serde_json::from_str(&raw).unwrap();
    assert!(parent.features.breakout_room_features.is_active);
}

#[tokio::test]
async fn test_join_scenario_uninvited_user_is_denied() {
    let setup = TestSetupBuilder::new()
        .with_participant("u3", "Carol", false)
        .build();

    setup
        .service
        .create_breakout_rooms(create_request())
        .await
        .unwrap();

    let result = setup
        .service
        .join_breakout_room(JoinBreakoutRoomRequest {
            room_id: "room1".to_string(),
            breakout_room_id: "room1:r1".to_string(),
            user_id: "u3".to_string(),
        })
        .await;

    assert!(matches!(result, Err(AppError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_join_scenario_invited_user_gets_scoped_token() {
    let setup = TestSetupBuilder::new()
        .with_participant("u1", "Alice", true)
        .build();

    setup
        .service
        .create_breakout_rooms(create_request())
        .await
        .unwrap();

    let token = setup
        .service
        .join_breakout_room(JoinBreakoutRoomRequest {
            room_id: "room1".to_string(),
            breakout_room_id: "room1:r1".to_string(),
            user_id: "u1".to_string(),
        })
        .await
        .unwrap();

    let claims = setup.issuer.validate_join_token(&token).unwrap();
    assert_eq!(claims.room_id, "room1:r1");
    assert_eq!(claims.user_id, "u1");
    assert_eq!(claims.name, "Alice");
    assert!(claims.is_admin);
}

#[tokio::test]
async fn test_increase_duration_scenario_event_carries_absolute_value() {
    let setup = TestSetupBuilder::new().build();

    setup
        .service
        .create_breakout_rooms(create_request())
        .await
        .unwrap();

    // Tracked with the original start time
    let before = setup.tracker.get("room1:r1").await.unwrap();
    let mut duration_events = setup.bus.subscribe_duration_events();

    setup
        .service
        .increase_breakout_room_duration(IncreaseDurationRequest {
            room_id: "room1".to_string(),
            breakout_room_id: "room1:r1".to_string(),
            duration: 45,
        })
        .await
        .unwrap();

    let event = duration_events.recv().await.unwrap();
    assert_eq!(event.event_type, DurationEventType::IncreaseDuration);
    assert_eq!(event.duration, 45);

    // Store-level consistency: an immediate read sees the new duration
    let rooms = setup.service.get_breakout_rooms("room1").await.unwrap();
    assert_eq!(rooms[0].duration, 45);

    // Applying the event keeps the deadline anchored to the original
    // start time, not the time of the update
    setup.tracker.increase_duration("room1:r1", 45).await;
    let after = setup.tracker.get("room1:r1").await.unwrap();
    assert_eq!(after.started_at, before.started_at);
    assert_eq!(after.deadline(), before.started_at + 45 * 60);
}

#[tokio::test]
async fn test_send_msg_reaches_every_active_breakout_room() {
    let setup = TestSetupBuilder::new().build();

    let mut request = create_request();
    request.rooms.push(BreakoutRoom {
        id: "r2".to_string(),
        title: "Team B".to_string(),
        duration: 0,
        users: vec![BreakoutRoomUser {
            id: "u3".to_string(),
            name: "Carol".to_string(),
        }],
    });
    setup.service.create_breakout_rooms(request).await.unwrap();

    let mut fanout = setup.bus.subscribe_fanout();
    setup
        .service
        .send_breakout_room_msg(SendBreakoutRoomMsgRequest {
            room_id: "room1".to_string(),
            msg: "wrap up".to_string(),
        })
        .await
        .unwrap();

    let mut targets = Vec::new();
    for _ in 0..2 {
        let msg = fanout.recv().await.unwrap();
        assert_eq!(msg.payload.body.event, "CHAT");
        assert_eq!(msg.payload.to, None);
        targets.push(msg.room_id);
    }
    targets.sort();
    assert_eq!(targets, vec!["room1:r1", "room1:r2"]);
}

#[tokio::test]
async fn test_end_one_room_then_listing_remainder() {
    let setup = TestSetupBuilder::new().build();

    let mut request = create_request();
    request.rooms.push(BreakoutRoom {
        id: "r2".to_string(),
        title: "Team B".to_string(),
        duration: 0,
        users: vec![BreakoutRoomUser {
            id: "u3".to_string(),
            name: "Carol".to_string(),
        }],
    });
    setup.service.create_breakout_rooms(request).await.unwrap();

    setup
        .service
        .end_breakout_room(EndBreakoutRoomRequest {
            room_id: "room1".to_string(),
            breakout_room_id: "room1:r1".to_string(),
        })
        .await
        .unwrap();

    assert!(!setup.directory.is_active("room1:r1"));
    let rooms = setup.service.get_breakout_rooms("room1").await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].id, "room1:r2");
}

#[tokio::test]
async fn test_end_all_clears_hash_and_listing_becomes_not_found() {
    let setup = TestSetupBuilder::new().build();
    setup
        .service
        .create_breakout_rooms(create_request())
        .await
        .unwrap();

    setup.service.end_breakout_rooms("room1").await.unwrap();

    assert!(!setup.directory.is_active("room1:r1"));
    let result = setup.service.get_breakout_rooms("room1").await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_created_record_count_never_exceeds_request() {
    let setup = TestSetupBuilder::new().build();

    // One of three children collides with an existing directory room
    setup.directory.insert_room("room1:r2", "{}".to_string());

    let mut request = create_request();
    for local_id in ["r2", "r3"] {
        request.rooms.push(BreakoutRoom {
            id: local_id.to_string(),
            title: format!("Team {}", local_id),
            duration: 0,
            users: vec![BreakoutRoomUser {
                id: "u9".to_string(),
                name: "Dave".to_string(),
            }],
        });
    }
    setup.service.create_breakout_rooms(request).await.unwrap();

    let records = setup.store.get_all_rooms("room1").await.unwrap();
    assert_eq!(records.len(), 2);
    for id in records.keys() {
        assert!(id.starts_with("room1:"));
    }
}
