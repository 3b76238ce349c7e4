//! Password-change guard.

use actix_web::web;

use crate::db::Gateway;
use crate::error::{AppError, AppResult};

pub const PASSWORD_IGUAL: &str = "La nueva contraseña debe ser distinta a la actual";

/// Reject a new password equal to the stored one.
///
/// No password in the request passes untouched. A missing user is a 404.
pub async fn validar_password_distinta(
    gateway: &dyn Gateway,
    usuario_id: i32,
    nueva: Option<&str>,
) -> AppResult<()> {
    let Some(nueva) = nueva.filter(|p| !p.is_empty()) else {
        return Ok(());
    };

    let hash = gateway
        .password_hash(usuario_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Usuario {}", usuario_id)))?;

    let nueva = nueva.to_string();
    let igual = web::block(move || bcrypt::verify(nueva, &hash))
        .await
        .map_err(|e| AppError::Database(format!("Password verify task failed: {}", e)))??;
    if igual {
        return Err(AppError::InvalidInput(PASSWORD_IGUAL.to_string()));
    }
    Ok(())
}
