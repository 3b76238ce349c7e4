//! Domain models for the gastos server.

use serde::{Deserialize, Deserializer};

pub mod archivo;
pub mod monto;
pub mod proveedor;
pub mod registro;
pub mod rol;
pub mod servicio_producto;
pub mod usuario;

// Re-export commonly used types
pub use archivo::{
    ArchivoAdjunto, ArchivoResponse, ArchivoSubidoResponse, EventoArchivoResponse,
    PresignRequest, PresignResponse,
};
pub use proveedor::{
    NuevoProveedor, ProveedorCheckQuery, ProveedorCheckResponse, ProveedorInput,
    ProveedorListResponse, ProveedorResponse,
};
pub use registro::{
    CotizacionResponse, DetalleResponse, DetalleValidado, EstadoCotizacion, EstadoGasto,
    GastoResponse, Moneda, NuevaCotizacion, NuevoGasto, RegistroInput, RegistroResponse,
    RegistroValidado, TipoRegistro, VistaPreviaRequest,
};
pub use rol::{CrearRolRequest, ROL_ADMINISTRADOR_ID, RolListResponse, RolResponse, permisos};
pub use servicio_producto::{NuevoServicioProducto, ServicioProductoInput, ServicioProductoResponse};
pub use usuario::{AuthContext, CambiarPasswordRequest, MensajeResponse, SessionClaims};

/// Deserialize a scalar that may arrive as a JSON string, number or bool.
///
/// `null` and a missing field both become `None`; blank strings are kept so
/// the validators can report them as missing.
pub(crate) fn texto_flexible<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
