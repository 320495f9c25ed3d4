use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::BreakoutRoom,
    service::BreakoutRoomService,
    types::{
        AckResponse, CreateBreakoutRoomsRequest, EndBreakoutRoomRequest, EndBreakoutRoomsRequest,
        GetBreakoutRoomsRequest, IncreaseDurationRequest, JoinBreakoutRoomRequest,
        JoinBreakoutRoomResponse, SendBreakoutRoomMsgRequest,
    },
};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> BreakoutRoomService {
    BreakoutRoomService::new(
        Arc::clone(&state.store),
        Arc::clone(&state.directory),
        Arc::clone(&state.token_issuer),
        state.bus.clone(),
    )
}

/// HTTP handler for creating breakout rooms under a parent
///
/// POST /breakout-room/create
#[instrument(name = "create_breakout_rooms", skip(state, request))]
pub async fn create_breakout_rooms(
    State(state): State<AppState>,
    Json(request): Json<CreateBreakoutRoomsRequest>,
) -> Result<Json<AckResponse>, AppError> {
    info!(room_id = %request.room_id, rooms = request.rooms.len(), "Creating breakout rooms");

    service(&state).create_breakout_rooms(request).await?;
    Ok(Json(AckResponse::ok()))
}

/// HTTP handler for admitting an invited user
///
/// POST /breakout-room/join
/// Returns a join credential for the breakout room
#[instrument(name = "join_breakout_room", skip(state, request))]
pub async fn join_breakout_room(
    State(state): State<AppState>,
    Json(request): Json<JoinBreakoutRoomRequest>,
) -> Result<Json<JoinBreakoutRoomResponse>, AppError> {
    info!(breakout_room_id = %request.breakout_room_id, user_id = %request.user_id, "Join requested");

    let token = service(&state).join_breakout_room(request).await?;
    Ok(Json(JoinBreakoutRoomResponse { token }))
}

/// HTTP handler for listing a parent's breakout rooms
///
/// POST /breakout-room/list
#[instrument(name = "get_breakout_rooms", skip(state, request))]
pub async fn get_breakout_rooms(
    State(state): State<AppState>,
    Json(request): Json<GetBreakoutRoomsRequest>,
) -> Result<Json<Vec<BreakoutRoom>>, AppError> {
    let rooms = service(&state).get_breakout_rooms(&request.room_id).await?;

    info!(room_id = %request.room_id, count = rooms.len(), "Breakout rooms listed");
    Ok(Json(rooms))
}

/// HTTP handler for replacing a breakout room's duration budget
///
/// POST /breakout-room/increase-duration
#[instrument(name = "increase_breakout_room_duration", skip(state, request))]
pub async fn increase_breakout_room_duration(
    State(state): State<AppState>,
    Json(request): Json<IncreaseDurationRequest>,
) -> Result<Json<AckResponse>, AppError> {
    service(&state)
        .increase_breakout_room_duration(request)
        .await?;
    Ok(Json(AckResponse::ok()))
}

/// HTTP handler for broadcasting a message to every breakout room
///
/// POST /breakout-room/send-msg
#[instrument(name = "send_breakout_room_msg", skip(state, request))]
pub async fn send_breakout_room_msg(
    State(state): State<AppState>,
    Json(request): Json<SendBreakoutRoomMsgRequest>,
) -> Result<Json<AckResponse>, AppError> {
    service(&state).send_breakout_room_msg(request).await?;
    Ok(Json(AckResponse::ok()))
}

/// HTTP handler for ending one breakout room
///
/// POST /breakout-room/end
#[instrument(name = "end_breakout_room", skip(state, request))]
pub async fn end_breakout_room(
    State(state): State<AppState>,
    Json(request): Json<EndBreakoutRoomRequest>,
) -> Result<Json<AckResponse>, AppError> {
    service(&state).end_breakout_room(request).await?;
    Ok(Json(AckResponse::ok()))
}

/// HTTP handler for ending every breakout room under a parent
///
/// POST /breakout-room/end-all
#[instrument(name = "end_breakout_rooms", skip(state, request))]
pub async fn end_breakout_rooms(
    State(state): State<AppState>,
    Json(request): Json<EndBreakoutRoomsRequest>,
) -> Result<Json<AckResponse>, AppError> {
    service(&state).end_breakout_rooms(&request.room_id).await?;
    Ok(Json(AckResponse::ok()))
}
