//! User API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthUser, require_permission};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CambiarPasswordRequest, MensajeResponse, permisos};
use crate::validation::validar_password_distinta;

/// Shortest password accepted.
pub const PASSWORD_LONGITUD_MINIMA: usize = 8;

fn password_nueva(req: &CambiarPasswordRequest) -> AppResult<&str> {
    let password = req.password.as_deref().unwrap_or_default();
    if password.is_empty() {
        return Err(AppError::validation(vec![
            "El campo password es obligatorio".to_string(),
        ]));
    }
    if password.chars().count() < PASSWORD_LONGITUD_MINIMA {
        return Err(AppError::validation(vec![format!(
            "La contraseña debe tener al menos {} caracteres",
            PASSWORD_LONGITUD_MINIMA
        )]));
    }
    Ok(password)
}

/// Change a user's password.
///
/// Users may change their own password; changing someone else's requires
/// `usuarios.editar`. The new password must differ from the current one.
#[utoipa::path(
    put,
    path = "/api/v1/usuarios/{id}/password",
    tag = "Usuarios",
    params(
        ("id" = i32, Path, description = "Usuario id")
    ),
    request_body = CambiarPasswordRequest,
    responses(
        (status = 200, description = "Password updated", body = MensajeResponse),
        (status = 400, description = "Same password as before", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn cambiar_password(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
    body: web::Json<CambiarPasswordRequest>,
) -> AppResult<HttpResponse> {
    let usuario_id = path.into_inner();
    if auth.0.usuario_id != usuario_id {
        require_permission(pool.get_ref(), &auth.0, permisos::USUARIOS_EDITAR).await?;
    }

    validar_password_distinta(pool.get_ref(), usuario_id, body.password.as_deref()).await?;
    let password = password_nueva(&body)?.to_string();

    let hash = web::block(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| AppError::Database(format!("Password hash task failed: {}", e)))??;
    pool.actualizar_password(usuario_id, hash).await?;

    info!(usuario_id, por = auth.0.usuario_id, "Password updated");
    Ok(HttpResponse::Ok().json(MensajeResponse {
        message: "Contraseña actualizada".to_string(),
    }))
}

/// Configure user routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/usuarios/{id}/password").route(web::put().to(cambiar_password)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(password: Option<&str>) -> CambiarPasswordRequest {
        CambiarPasswordRequest {
            password: password.map(str::to_string),
        }
    }

    #[test]
    fn test_password_required_and_long_enough() {
        assert!(matches!(
            password_nueva(&req(None)),
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            password_nueva(&req(Some("corta"))),
            Err(AppError::Validation { .. })
        ));
        assert_eq!(password_nueva(&req(Some("suficiente"))).unwrap(), "suficiente");
    }
}
