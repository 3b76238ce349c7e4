//! Provider API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthUser, require_permission};
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{
    ProveedorCheckQuery, ProveedorCheckResponse, ProveedorInput, ProveedorListResponse,
    ProveedorResponse, permisos,
};
use crate::validation::validar_proveedor;

/// List providers ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/proveedores",
    tag = "Proveedores",
    responses(
        (status = 200, description = "Providers", body = ProveedorListResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn list_proveedores(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::PROVEEDORES_VER).await?;

    let proveedores = pool
        .list_proveedores()
        .await?
        .into_iter()
        .map(ProveedorResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(ProveedorListResponse { proveedores }))
}

/// Create a provider after re-checking the form server-side.
#[utoipa::path(
    post,
    path = "/api/v1/proveedores",
    tag = "Proveedores",
    request_body = ProveedorInput,
    responses(
        (status = 201, description = "Provider created", body = ProveedorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn crear_proveedor(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<ProveedorInput>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::PROVEEDORES_CREAR).await?;

    let nuevo = validar_proveedor(pool.get_ref(), &body).await?;
    let proveedor = pool.insert_proveedor(&nuevo).await?;

    info!(proveedor_id = proveedor.id, "Proveedor created");
    Ok(HttpResponse::Created().json(ProveedorResponse::from(proveedor)))
}

/// Whether a provider with the same (nombre, email, telefono) exists.
#[utoipa::path(
    get,
    path = "/api/v1/proveedores/check",
    tag = "Proveedores",
    params(ProveedorCheckQuery),
    responses(
        (status = 200, description = "Lookup result", body = ProveedorCheckResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn check_proveedor(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    query: web::Query<ProveedorCheckQuery>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::PROVEEDORES_VER).await?;

    let query = query.into_inner();
    let limpio = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let existe = pool
        .proveedor_duplicado(
            query.nombre.trim(),
            limpio(&query.email).as_deref(),
            limpio(&query.telefono).as_deref(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ProveedorCheckResponse { existe }))
}

/// Configure provider routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/proveedores/check").route(web::get().to(check_proveedor)))
        .service(
            web::resource("/proveedores")
                .route(web::get().to(list_proveedores))
                .route(web::post().to(crear_proveedor)),
        );
}
