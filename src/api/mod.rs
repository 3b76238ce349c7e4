//! API endpoint modules.

pub mod archivos;
pub mod clientes;
pub mod health;
pub mod openapi;
pub mod proveedores;
pub mod registros;
pub mod roles;
pub mod servicios_productos;
pub mod usuarios;

use actix_web::web;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;

/// Mount every resource under the caller's scope (`/api/v1`).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_health_routes)
        .configure(registros::configure_routes)
        .configure(proveedores::configure_routes)
        .configure(roles::configure_routes)
        .configure(clientes::configure_routes)
        .configure(usuarios::configure_routes)
        .configure(servicios_productos::configure_routes)
        .configure(archivos::configure_routes);
}
