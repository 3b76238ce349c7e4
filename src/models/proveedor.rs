//! Provider models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::texto_flexible;
use crate::entity::proveedor;

/// Provider form as submitted by the UI.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProveedorInput {
    #[serde(default, deserialize_with = "texto_flexible")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub direccion: Option<String>,
    /// Tax id, `J-#########`
    #[serde(default, deserialize_with = "texto_flexible")]
    pub rif: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub banco: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub numero_cuenta: Option<String>,
}

/// Provider that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NuevoProveedor {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub rif: String,
    pub banco: Option<String>,
    pub numero_cuenta: Option<String>,
}

/// Duplicate lookup key: (nombre, email, telefono).
#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProveedorCheckQuery {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
}

/// Result of the duplicate lookup.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProveedorCheckResponse {
    pub existe: bool,
}

/// Provider as listed by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProveedorResponse {
    pub id: i32,
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub rif: String,
    pub banco: Option<String>,
    pub numero_cuenta: Option<String>,
    pub estado: String,
    pub created_at: DateTime<Utc>,
}

impl From<proveedor::Model> for ProveedorResponse {
    fn from(m: proveedor::Model) -> Self {
        Self {
            id: m.id,
            nombre: m.nombre,
            email: m.email,
            telefono: m.telefono,
            direccion: m.direccion,
            rif: m.rif,
            banco: m.banco,
            numero_cuenta: m.numero_cuenta,
            estado: m.estado,
            created_at: m.created_at,
        }
    }
}

/// Provider list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProveedorListResponse {
    pub proveedores: Vec<ProveedorResponse>,
}
