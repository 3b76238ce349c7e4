//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gastos Server",
        version = "0.1.0",
        description = "API for expense requests (gastos), price quotations (cotizaciones) and their documents"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health
        api::health::health,
        api::health::ready,
        // Registros
        api::registros::crear_registro,
        api::registros::vista_previa_cotizacion,
        api::registros::solicitud_pago,
        // Proveedores
        api::proveedores::list_proveedores,
        api::proveedores::crear_proveedor,
        api::proveedores::check_proveedor,
        // Roles
        api::roles::list_roles,
        api::roles::crear_rol,
        // Clientes
        api::clientes::eliminar_cliente,
        // Usuarios
        api::usuarios::cambiar_password,
        // Catalogue
        api::servicios_productos::crear_servicio_producto,
        // Archivos
        api::archivos::subir_archivo,
        api::archivos::presign_archivo,
        api::archivos::eventos_archivo,
    ),
    components(
        schemas(
            // Errors
            error::ErrorResponse,
            error::ValidationErrorResponse,
            error::QuotaErrorResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // Registros
            models::TipoRegistro,
            models::Moneda,
            models::EstadoGasto,
            models::EstadoCotizacion,
            models::RegistroInput,
            models::VistaPreviaRequest,
            models::RegistroResponse,
            models::GastoResponse,
            models::CotizacionResponse,
            models::DetalleResponse,
            // Proveedores
            models::ProveedorInput,
            models::ProveedorResponse,
            models::ProveedorListResponse,
            models::ProveedorCheckResponse,
            // Roles
            models::CrearRolRequest,
            models::RolResponse,
            models::RolListResponse,
            // Usuarios
            models::CambiarPasswordRequest,
            models::MensajeResponse,
            // Catalogue
            models::ServicioProductoInput,
            models::ServicioProductoResponse,
            // Archivos
            models::ArchivoResponse,
            models::ArchivoSubidoResponse,
            models::PresignRequest,
            models::PresignResponse,
            models::EventoArchivoResponse,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Registros", description = "Gastos and cotizaciones"),
        (name = "Proveedores", description = "Providers"),
        (name = "Roles", description = "Roles and permissions"),
        (name = "Clientes", description = "Clients"),
        (name = "Usuarios", description = "Users"),
        (name = "Servicios y productos", description = "Billable catalogue"),
        (name = "Archivos", description = "Repository files and audit trail")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the bearer session token scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
