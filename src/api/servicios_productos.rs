//! Services/products catalogue handlers.

use actix_web::{HttpResponse, web};
use tracing::info;

use crate::auth::{AuthUser, require_permission};
use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::{ServicioProductoInput, ServicioProductoResponse, permisos};
use crate::validation::validar_servicio_producto;

/// Create a catalogue item.
#[utoipa::path(
    post,
    path = "/api/v1/servicios-productos",
    tag = "Servicios y productos",
    request_body = ServicioProductoInput,
    responses(
        (status = 201, description = "Item created", body = ServicioProductoResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn crear_servicio_producto(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    body: web::Json<ServicioProductoInput>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::SERVICIOS_CREAR).await?;

    let nuevo = validar_servicio_producto(&body)?;
    let creado = pool.insert_servicio_producto(&nuevo).await?;

    info!(servicio_producto_id = creado.id, "Servicio/producto created");
    Ok(HttpResponse::Created().json(ServicioProductoResponse::from(creado)))
}

/// Configure catalogue routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/servicios-productos").route(web::post().to(crear_servicio_producto)),
    );
}
