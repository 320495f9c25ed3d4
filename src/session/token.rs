use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::{JoinTokenClaims, JoinTokenRequest};
use crate::shared::AppError;

/// Issues join credentials for users admitted into breakout rooms.
/// The production implementation talks to the external token service;
/// the JWT issuer below stands in for it.
#[async_trait]
pub trait JoinTokenIssuer {
    async fn issue_join_token(&self, request: &JoinTokenRequest) -> Result<String, AppError>;
}

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub expiry_minutes: i64,
}

impl TokenConfig {
    pub fn new() -> Self {
        // Allow configuring expiry via env var, default to 2 hours
        let expiry_minutes = std::env::var("JOIN_TOKEN_EXPIRY_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(120);

        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "your-secret-key-change-in-production".to_string()),
            expiry_minutes,
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// HS256 join-credential issuer
#[derive(Clone, Default)]
pub struct JwtJoinTokenIssuer {
    config: TokenConfig,
}

impl JwtJoinTokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Validates a join credential and returns its claims
    #[instrument(skip(self, token))]
    pub fn validate_join_token(&self, token: &str) -> Result<JoinTokenClaims, AppError> {
        decode::<JoinTokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| {
            debug!(
                room_id = %data.claims.room_id,
                user_id = %data.claims.user_id,
                "Join token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode join token");
            AppError::Token(e.to_string())
        })
    }
}

#[async_trait]
impl JoinTokenIssuer for JwtJoinTokenIssuer {
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %request.user_id))]
    async fn issue_join_token(&self, request: &JoinTokenRequest) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + Duration::minutes(self.config.expiry_minutes)).timestamp() as usize;

        debug!(
            expiry_minutes = self.config.expiry_minutes,
            exp_timestamp = exp,
            "Issuing join token"
        );

        let claims = JoinTokenClaims {
            room_id: request.room_id.clone(),
            user_id: request.user_id.clone(),
            name: request.name.clone(),
            is_admin: request.is_admin,
            user_metadata: request.metadata.clone(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode join token");
            AppError::Token(e.to_string())
        })
    }
}
