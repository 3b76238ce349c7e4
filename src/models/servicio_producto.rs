//! Billable service/product models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::texto_flexible;
use crate::entity::servicio_producto;

/// Service/product form.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ServicioProductoInput {
    #[serde(default, deserialize_with = "texto_flexible")]
    pub nombre: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub precio_unitario: Option<String>,
    /// One of 0, 8, 16
    #[serde(default, deserialize_with = "texto_flexible")]
    pub porcentaje_iva: Option<String>,
}

/// Service/product that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct NuevoServicioProducto {
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
}

/// Stored service/product.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServicioProductoResponse {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<servicio_producto::Model> for ServicioProductoResponse {
    fn from(m: servicio_producto::Model) -> Self {
        Self {
            id: m.id,
            nombre: m.nombre,
            descripcion: m.descripcion,
            precio_unitario: m.precio_unitario,
            porcentaje_iva: m.porcentaje_iva,
            created_at: m.created_at,
        }
    }
}
