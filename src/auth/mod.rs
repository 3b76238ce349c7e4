//! Session token verification and permission checks.
//!
//! Tokens are issued elsewhere; this module only verifies HS256 bearer
//! tokens and turns them into an explicit [`AuthContext`].

mod extractor;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};

use crate::db::Gateway;
use crate::error::{AppError, AppResult};
use crate::models::{AuthContext, ROL_ADMINISTRADOR_ID, SessionClaims};

pub use extractor::AuthUser;

/// Verifies session tokens with the shared secret.
///
/// The secret stays wrapped in `SecretString`, so `Debug` never prints it.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: SecretString,
}

impl TokenVerifier {
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Decode and validate a token (signature and expiry).
    pub fn verify(&self, token: &str) -> AppResult<AuthContext> {
        let key = DecodingKey::from_secret(self.secret.expose_secret().as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        let claims = decode::<SessionClaims>(token, &key, &validation)
            .map_err(|e| AppError::Unauthorized(format!("Token inválido: {}", e)))?
            .claims;

        let usuario_id = claims
            .sub
            .parse::<i32>()
            .map_err(|_| AppError::Unauthorized("Token sin usuario válido".to_string()))?;

        Ok(AuthContext {
            usuario_id,
            rol_id: claims.rol_id,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TokenVerifier([REDACTED])")
    }
}

/// Require `clave` for the caller's role. The administrator role holds every permission.
pub async fn require_permission(
    gateway: &dyn Gateway,
    auth: &AuthContext,
    clave: &str,
) -> AppResult<()> {
    if auth.rol_id == ROL_ADMINISTRADOR_ID || gateway.rol_tiene_permiso(auth.rol_id, clave).await? {
        return Ok(());
    }

    tracing::warn!(
        usuario_id = auth.usuario_id,
        rol_id = auth.rol_id,
        permiso = clave,
        "Permission denied"
    );
    Err(AppError::Forbidden(clave.to_string()))
}
