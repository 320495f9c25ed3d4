// Join credential issuance for breakout room admission

// Public API - what other modules can use
pub use token::{JoinTokenIssuer, JwtJoinTokenIssuer, TokenConfig};
pub use types::{JoinTokenClaims, JoinTokenRequest};

// Internal modules
mod token;
mod types;
