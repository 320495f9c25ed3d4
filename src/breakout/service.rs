use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use super::{
    models::{BreakoutRoom, RoomMetadata, UserMetadata},
    repository::BreakoutStore,
    types::{
        CreateBreakoutRoomsRequest, EndBreakoutRoomRequest, IncreaseDurationRequest,
        JoinBreakoutRoomRequest, SendBreakoutRoomMsgRequest,
    },
};
use crate::directory::{DirectoryCreateRequest, RoomDirectory};
use crate::event::{Delivery, DurationEvent, FanoutMessage, NotificationBus};
use crate::session::{JoinTokenIssuer, JoinTokenRequest};
use crate::shared::AppError;

/// Service for breakout room lifecycle operations.
///
/// Single-target operations (join, increase duration, end one) fail
/// fast; bulk fan-out paths (create many, end many, broadcasts) are
/// best-effort per item.
pub struct BreakoutRoomService {
    store: Arc<dyn BreakoutStore + Send + Sync>,
    directory: Arc<dyn RoomDirectory + Send + Sync>,
    token_issuer: Arc<dyn JoinTokenIssuer + Send + Sync>,
    bus: NotificationBus,
}

impl BreakoutRoomService {
    pub fn new(
        store: Arc<dyn BreakoutStore + Send + Sync>,
        directory: Arc<dyn RoomDirectory + Send + Sync>,
        token_issuer: Arc<dyn JoinTokenIssuer + Send + Sync>,
        bus: NotificationBus,
    ) -> Self {
        Self {
            store,
            directory,
            token_issuer,
            bus,
        }
    }

    /// Creates the requested breakout rooms under a parent.
    ///
    /// Per-room directory or store failures are logged and skipped; the
    /// call fails only when the parent cannot be loaded/deserialized or
    /// the final parent-metadata update fails.
    #[instrument(skip(self, request), fields(room_id = %request.room_id))]
    pub async fn create_breakout_rooms(
        &self,
        request: CreateBreakoutRoomsRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let parent_raw = self.directory.load_room_metadata(&request.room_id).await?;
        let mut template: RoomMetadata = serde_json::from_str(&parent_raw)?;

        // Child rooms inherit the parent's metadata with the breakout
        // restrictions applied: no recording, no RTMP, no nested
        // breakouts, no waiting room.
        template.features.room_duration = request.duration;
        template.is_breakout_room = true;
        template.welcome_message = request.welcome_msg.clone();
        template.features.breakout_room_features.is_allow = false;
        template.features.breakout_room_features.is_active = false;
        template.features.waiting_room_features.is_active = false;
        template.features.allow_recording = false;
        template.features.allow_rtmp = false;

        let mut created: Vec<BreakoutRoom> = Vec::new();

        for room in &request.rooms {
            let breakout_room_id = format!("{}:{}", request.room_id, room.id);
            template.room_title = room.title.clone();

            let outcome = match self
                .directory
                .create_room(&DirectoryCreateRequest {
                    room_id: breakout_room_id.clone(),
                    metadata: template.clone(),
                })
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(breakout_room_id = %breakout_room_id, error = %e, "Directory create failed");
                    continue;
                }
            };
            if !outcome.ok {
                error!(breakout_room_id = %breakout_room_id, message = %outcome.message, "Directory rejected room");
                continue;
            }

            let mut record = room.clone();
            record.id = breakout_room_id.clone();
            record.duration = request.duration;

            let serialized = match serde_json::to_string(&record) {
                Ok(serialized) => serialized,
                Err(e) => {
                    error!(breakout_room_id = %breakout_room_id, error = %e, "Could not serialize record");
                    continue;
                }
            };
            if let Err(e) = self
                .store
                .put_room(&request.room_id, &breakout_room_id, serialized)
                .await
            {
                error!(breakout_room_id = %breakout_room_id, error = %e, "Could not persist record");
                continue;
            }

            created.push(record);
        }

        // Invitation fan-out: a failed notification for one user must not
        // block the others.
        for record in &created {
            for user in &record.users {
                self.bus.publish_fanout(FanoutMessage::notification(
                    &request.room_id,
                    &request.requested_user_id,
                    Delivery::Unicast {
                        to: user.id.clone(),
                    },
                    "SYSTEM",
                    "JOIN_BREAKOUT_ROOM",
                    &record.id,
                    false,
                ));
            }
        }

        info!(
            requested = request.rooms.len(),
            created = created.len(),
            "Breakout rooms created"
        );

        // Re-read the parent fresh rather than reusing the mutated copy,
        // so concurrent metadata edits are not clobbered.
        let parent_raw = self.directory.load_room_metadata(&request.room_id).await?;
        let mut parent_meta: RoomMetadata = serde_json::from_str(&parent_raw)?;
        parent_meta.features.breakout_room_features.is_active = true;

        let serialized = serde_json::to_string(&parent_meta)?;
        self.directory
            .update_room_metadata(&request.room_id, serialized)
            .await?;

        Ok(())
    }

    /// Admits an invited user and returns a join credential.
    /// Membership is closed: only ids on the creation-time invite list
    /// may join.
    #[instrument(skip(self, request), fields(breakout_room_id = %request.breakout_room_id, user_id = %request.user_id))]
    pub async fn join_breakout_room(
        &self,
        request: JoinBreakoutRoomRequest,
    ) -> Result<String, AppError> {
        request.validate()?;

        let room = self
            .fetch_breakout_room(&request.room_id, &request.breakout_room_id)
            .await?;

        if !room.is_invited(&request.user_id) {
            return Err(AppError::PermissionDenied(
                "you are not invited to this breakout room".to_string(),
            ));
        }

        // Invitation presence is the only membership check; users unknown
        // to the parent's live registry still fail the lookup below.
        let participant = self
            .directory
            .load_participant_metadata(&request.room_id, &request.user_id)
            .await?;
        let metadata: UserMetadata = serde_json::from_str(&participant.metadata)?;

        let token = self
            .token_issuer
            .issue_join_token(&JoinTokenRequest {
                room_id: request.breakout_room_id.clone(),
                user_id: request.user_id.clone(),
                name: participant.name,
                is_admin: metadata.is_admin,
                metadata,
            })
            .await?;

        info!("Join token issued");
        Ok(token)
    }

    /// All current breakout rooms for a parent. NotFound when none exist.
    #[instrument(skip(self))]
    pub async fn get_breakout_rooms(
        &self,
        parent_room_id: &str,
    ) -> Result<Vec<BreakoutRoom>, AppError> {
        self.fetch_breakout_rooms(parent_room_id).await
    }

    /// Replaces a breakout room's duration budget. The event goes out
    /// before the store write so every process's tracker converges to
    /// the same absolute value.
    #[instrument(skip(self, request), fields(breakout_room_id = %request.breakout_room_id))]
    pub async fn increase_breakout_room_duration(
        &self,
        request: IncreaseDurationRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let mut room = self
            .fetch_breakout_room(&request.room_id, &request.breakout_room_id)
            .await?;

        self.bus
            .publish_duration_event(DurationEvent::increase_duration(
                &request.breakout_room_id,
                request.duration,
            ));

        room.duration = request.duration;
        let serialized = serde_json::to_string(&room)?;
        self.store
            .put_room(&request.room_id, &request.breakout_room_id, serialized)
            .await?;

        info!(duration = request.duration, "Breakout room duration replaced");
        Ok(())
    }

    /// Broadcasts a chat message to every active breakout room under the
    /// parent, best-effort per room.
    #[instrument(skip(self, request), fields(room_id = %request.room_id))]
    pub async fn send_breakout_room_msg(
        &self,
        request: SendBreakoutRoomMsgRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let rooms = self.fetch_breakout_rooms(&request.room_id).await?;

        for room in &rooms {
            self.bus.publish_fanout(FanoutMessage::notification(
                &room.id,
                "system",
                Delivery::Broadcast,
                "USER",
                "CHAT",
                &request.msg,
                true,
            ));
        }

        info!(rooms = rooms.len(), "Message broadcast to breakout rooms");
        Ok(())
    }

    /// Ends one breakout room. Unlike the bulk variant, a directory end
    /// failure here is propagated to the caller.
    #[instrument(skip(self, request), fields(breakout_room_id = %request.breakout_room_id))]
    pub async fn end_breakout_room(&self, request: EndBreakoutRoomRequest) -> Result<(), AppError> {
        request.validate()?;

        self.fetch_breakout_room(&request.room_id, &request.breakout_room_id)
            .await?;

        let ended = self.directory.end_room(&request.breakout_room_id).await?;
        if !ended {
            return Err(AppError::Downstream(format!(
                "directory could not end room {}",
                request.breakout_room_id
            )));
        }

        self.store
            .delete_room(&request.room_id, &request.breakout_room_id)
            .await?;

        info!("Breakout room ended");
        Ok(())
    }

    /// Ends every breakout room under a parent. Per-room end failures
    /// are logged and skipped; the parent's hash entry is deleted
    /// unconditionally afterward.
    #[instrument(skip(self))]
    pub async fn end_breakout_rooms(&self, parent_room_id: &str) -> Result<(), AppError> {
        let rooms = self.fetch_breakout_rooms(parent_room_id).await?;

        for room in &rooms {
            match self.directory.end_room(&room.id).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(breakout_room_id = %room.id, "Room was already ended");
                }
                Err(e) => {
                    warn!(breakout_room_id = %room.id, error = %e, "Could not end room");
                }
            }
        }

        self.store.delete_all(parent_room_id).await?;

        info!(rooms = rooms.len(), "All breakout rooms ended");
        Ok(())
    }

    async fn fetch_breakout_room(
        &self,
        parent_room_id: &str,
        breakout_room_id: &str,
    ) -> Result<BreakoutRoom, AppError> {
        let raw = self
            .store
            .get_room(parent_room_id, breakout_room_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("breakout room {} not found", breakout_room_id))
            })?;

        let mut room: BreakoutRoom = serde_json::from_str(&raw)?;
        room.id = breakout_room_id.to_string();
        Ok(room)
    }

    async fn fetch_breakout_rooms(
        &self,
        parent_room_id: &str,
    ) -> Result<Vec<BreakoutRoom>, AppError> {
        let raw: HashMap<String, String> = self.store.get_all_rooms(parent_room_id).await?;
        if raw.is_empty() {
            return Err(AppError::NotFound(format!(
                "no breakout rooms found for {}",
                parent_room_id
            )));
        }

        let mut rooms = Vec::with_capacity(raw.len());
        for (breakout_room_id, value) in raw {
            match serde_json::from_str::<BreakoutRoom>(&value) {
                Ok(mut room) => {
                    room.id = breakout_room_id;
                    rooms.push(room);
                }
                Err(e) => {
                    warn!(breakout_room_id = %breakout_room_id, error = %e, "Skipping malformed record");
                }
            }
        }

        Ok(rooms)
    }
}
