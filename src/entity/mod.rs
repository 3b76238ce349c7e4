//! SeaORM entity definitions for PostgreSQL database.

pub mod archivo;
pub mod carpeta;
pub mod cliente;
pub mod cotizacion;
pub mod cotizacion_detalle;
pub mod cuenta_por_cobrar;
pub mod evento_archivo;
pub mod gasto;
pub mod proveedor;
pub mod rol;
pub mod rol_permiso;
pub mod servicio_producto;
pub mod sucursal;
pub mod tipo_gasto;
pub mod usuario;
