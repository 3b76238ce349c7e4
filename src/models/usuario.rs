//! User and session models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity carried by a verified session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub usuario_id: i32,
    pub rol_id: i32,
}

/// Session token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Usuario id
    pub sub: String,
    pub rol_id: i32,
    pub exp: usize,
}

/// Request to change a user's password.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CambiarPasswordRequest {
    pub password: Option<String>,
}

/// Generic confirmation body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MensajeResponse {
    pub message: String,
}
