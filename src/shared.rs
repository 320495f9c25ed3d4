use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

use crate::breakout::repository::BreakoutStore;
use crate::directory::RoomDirectory;
use crate::event::NotificationBus;
use crate::session::JoinTokenIssuer;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn BreakoutStore + Send + Sync>,
    pub directory: Arc<dyn RoomDirectory + Send + Sync>,
    pub token_issuer: Arc<dyn JoinTokenIssuer + Send + Sync>,
    pub bus: NotificationBus,
}

impl AppState {
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
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("downstream error: {0}")]
    Downstream(String),

    #[error("token error: {0}")]
    Token(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::Serialization(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("serialization error: {}", e),
            ),
            AppError::Downstream(msg) => (
                StatusCode::BAD_GATEWAY,
                format!("downstream error: {}", msg),
            ),
            AppError::Token(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}
