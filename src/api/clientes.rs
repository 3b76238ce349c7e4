//! Client API handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthUser, require_permission};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{MensajeResponse, permisos};
use crate::validation::validar_eliminacion_cliente;

/// Delete a client that has no pending receivables and no in-process quotations.
#[utoipa::path(
    delete,
    path = "/api/v1/clientes/{id}",
    tag = "Clientes",
    params(
        ("id" = i32, Path, description = "Cliente id")
    ),
    responses(
        (status = 200, description = "Client deleted", body = MensajeResponse),
        (status = 400, description = "Client has open business", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
        (status = 404, description = "Client not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn eliminar_cliente(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::CLIENTES_ELIMINAR).await?;
    let cliente_id = path.into_inner();

    if !pool.cliente_existe(cliente_id).await? {
        return Err(AppError::NotFound(format!("Cliente {}", cliente_id)));
    }

    validar_eliminacion_cliente(pool.get_ref(), cliente_id).await?;

    if !pool.eliminar_cliente(cliente_id).await? {
        return Err(AppError::NotFound(format!("Cliente {}", cliente_id)));
    }

    info!(cliente_id, usuario_id = auth.0.usuario_id, "Cliente deleted");
    Ok(HttpResponse::Ok().json(MensajeResponse {
        message: "Cliente eliminado".to_string(),
    }))
}

/// Configure client routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/clientes/{id}").route(web::delete().to(eliminar_cliente)));
}
