//! Role API handlers.

use std::collections::BTreeSet;

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthUser, require_permission};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{CrearRolRequest, RolListResponse, RolResponse, permisos};

/// Trimmed name and deduplicated known permission keys.
fn validar_rol(req: &CrearRolRequest) -> AppResult<(String, Vec<String>)> {
    let mut errores = Vec::new();

    let nombre = req.nombre.trim();
    if nombre.is_empty() {
        errores.push("El campo nombre es obligatorio".to_string());
    }

    let claves: BTreeSet<&str> = req.permisos.iter().map(|p| p.trim()).collect();
    for clave in &claves {
        if !permisos::TODOS.contains(clave) {
            errores.push(format!("Permiso desconocido: '{}'", clave));
        }
    }

    if !errores.is_empty() {
        return Err(AppError::validation(errores));
    }
    Ok((
        nombre.to_string(),
        claves.into_iter().map(str::to_string).collect(),
    ))
}

/// List roles with their permission keys.
#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "Roles",
    responses(
        (status = 200, description = "Roles", body = RolListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_roles(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::ROLES_VER).await?;

    let roles = pool
        .list_roles()
        .await?
        .into_iter()
        .map(|(rol, permisos)| RolResponse::from_model(rol, permisos))
        .collect();

    Ok(HttpResponse::Ok().json(RolListResponse { roles }))
}

/// Create a role with its permissions.
#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "Roles",
    request_body = CrearRolRequest,
    responses(
        (status = 201, description = "Role created", body = RolResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn crear_rol(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<CrearRolRequest>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::ROLES_CREAR).await?;

    let (nombre, claves) = validar_rol(&body)?;
    let descripcion = body
        .descripcion
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let (rol, permisos) = pool.insert_rol(&nombre, descripcion, &claves).await?;

    info!(rol_id = rol.id, permisos = permisos.len(), "Rol created");
    Ok(HttpResponse::Created().json(RolResponse::from_model(rol, permisos)))
}

/// Configure role routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/roles")
            .route(web::get().to(list_roles))
            .route(web::post().to(crear_rol)),
    );
}
