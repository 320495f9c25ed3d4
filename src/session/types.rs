use serde::{Deserialize, Serialize};

use crate::breakout::models::UserMetadata;

/// Everything the token service needs to mint a join credential for a
/// user admitted into a breakout room
#[derive(Debug, Clone)]
pub struct JoinTokenRequest {
    /// The breakout room the credential is scoped to.
    pub room_id: String,
    pub user_id: String,
    pub name: String,
    pub is_admin: bool,
    pub metadata: UserMetadata,
}

/// JWT claims carried by a join credential
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinTokenClaims {
    pub room_id: String,
    pub user_id: String,
    pub name: String,
    pub is_admin: bool,
    pub user_metadata: UserMetadata,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
    pub jti: String,
}
