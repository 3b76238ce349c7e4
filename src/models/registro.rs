//! Registro models: the gasto | cotizacion discriminated request and its
//! normalized, validated forms.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::archivo::{ArchivoAdjunto, ArchivoResponse};
use super::monto;
use super::texto_flexible;
use crate::entity::{cotizacion, cotizacion_detalle, gasto};
use crate::error::AppResult;

/// Registro discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TipoRegistro {
    Gasto,
    Cotizacion,
}

impl TipoRegistro {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gasto => "gasto",
            Self::Cotizacion => "cotizacion",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "gasto" => Some(Self::Gasto),
            "cotizacion" => Some(Self::Cotizacion),
            _ => None,
        }
    }
}

impl std::fmt::Display for TipoRegistro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Moneda {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "VES")]
    Ves,
}

impl Moneda {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Ves => "VES",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Some(Self::Usd),
            "VES" => Some(Self::Ves),
            _ => None,
        }
    }

    /// Prefix used when printing amounts.
    pub fn simbolo(&self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Ves => "Bs",
        }
    }
}

impl std::fmt::Display for Moneda {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Gasto lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EstadoGasto {
    Pendiente,
    Solicitado,
    Aprobado,
    Pagado,
}

impl EstadoGasto {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::Solicitado => "solicitado",
            Self::Aprobado => "aprobado",
            Self::Pagado => "pagado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pendiente" => Some(Self::Pendiente),
            "solicitado" => Some(Self::Solicitado),
            "aprobado" => Some(Self::Aprobado),
            "pagado" => Some(Self::Pagado),
            _ => None,
        }
    }
}

/// Cotizacion lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EstadoCotizacion {
    Pendiente,
    EnProceso,
    Aprobada,
    Rechazada,
}

impl EstadoCotizacion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => "pendiente",
            Self::EnProceso => "en_proceso",
            Self::Aprobada => "aprobada",
            Self::Rechazada => "rechazada",
        }
    }
}

/// Raw registro payload as received from the JSON or multipart flow.
///
/// Every scalar is kept as text so that numbers sent as strings (multipart)
/// and as JSON numbers go through the same validation path.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegistroInput {
    /// `gasto` or `cotizacion`
    #[serde(default, deserialize_with = "texto_flexible")]
    pub tipo: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub fecha: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub sucursal_id: Option<String>,
    /// Creator; defaults to the authenticated user
    #[serde(default, deserialize_with = "texto_flexible")]
    pub usuario_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub observacion: Option<String>,

    // Gasto
    #[serde(default, deserialize_with = "texto_flexible")]
    pub proveedor_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub tipo_gasto_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub concepto_pago: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub subtotal: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub porcentaje_iva: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub moneda: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub tasa_cambio: Option<String>,

    // Cotizacion
    #[serde(default, deserialize_with = "texto_flexible")]
    pub cliente_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub total: Option<String>,
    /// Line items, as a JSON array or its JSON text
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub detalle: Option<serde_json::Value>,

    /// Declared file size for quota accounting (JSON flow)
    #[serde(default, deserialize_with = "texto_flexible")]
    pub size: Option<String>,
}

impl RegistroInput {
    /// Build the input from multipart text fields.
    ///
    /// `detalle` arrives as JSON text and is decoded when it parses.
    pub fn from_campos(campos: &HashMap<String, String>) -> AppResult<Self> {
        let mut map = serde_json::Map::with_capacity(campos.len());
        for (nombre, valor) in campos {
            let value = if nombre == "detalle" {
                serde_json::from_str(valor)
                    .unwrap_or_else(|_| serde_json::Value::String(valor.clone()))
            } else {
                serde_json::Value::String(valor.clone())
            };
            map.insert(nombre.clone(), value);
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }
}

/// Gasto that passed every check and is ready to insert.
#[derive(Debug, Clone)]
pub struct NuevoGasto {
    pub proveedor_id: Option<i32>,
    pub tipo_gasto_id: i32,
    pub concepto_pago: String,
    pub subtotal: Decimal,
    pub porcentaje_iva: Decimal,
    pub fecha: NaiveDate,
    pub sucursal_id: i32,
    pub moneda: Moneda,
    pub tasa_cambio: Option<Decimal>,
    pub observacion: Option<String>,
    pub usuario_id: i32,
    pub documento: ArchivoAdjunto,
}

impl NuevoGasto {
    pub fn monto_iva(&self) -> AppResult<Decimal> {
        monto::iva(self.subtotal, self.porcentaje_iva)
    }

    pub fn total(&self) -> AppResult<Decimal> {
        monto::sumar(self.subtotal, self.monto_iva()?)
    }
}

/// A validated cotizacion line.
#[derive(Debug, Clone, PartialEq)]
pub struct DetalleValidado {
    pub servicio_productos_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
}

impl DetalleValidado {
    pub fn subtotal(&self) -> AppResult<Decimal> {
        monto::importe(self.cantidad, self.precio_unitario)
    }
}

/// Cotizacion that passed every check and is ready to insert.
#[derive(Debug, Clone)]
pub struct NuevaCotizacion {
    pub cliente_id: i32,
    pub sucursal_id: Option<i32>,
    pub fecha: NaiveDate,
    pub total: Decimal,
    pub detalle: Vec<DetalleValidado>,
    pub observacion: Option<String>,
    pub usuario_id: i32,
}

/// Normalized payload handed from the validator chain to the controllers.
#[derive(Debug, Clone)]
pub enum RegistroValidado {
    Gasto(NuevoGasto),
    Cotizacion(NuevaCotizacion),
}

impl RegistroValidado {
    pub fn tipo(&self) -> TipoRegistro {
        match self {
            Self::Gasto(_) => TipoRegistro::Gasto,
            Self::Cotizacion(_) => TipoRegistro::Cotizacion,
        }
    }
}

/// Created gasto.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GastoResponse {
    pub id: i32,
    /// Document code, e.g. `G-000042`
    pub codigo: String,
    pub proveedor_id: Option<i32>,
    pub tipo_gasto_id: i32,
    pub concepto_pago: String,
    pub subtotal: Decimal,
    pub porcentaje_iva: Decimal,
    pub monto_iva: Decimal,
    pub total: Decimal,
    pub fecha: NaiveDate,
    pub sucursal_id: i32,
    pub moneda: String,
    pub tasa_cambio: Option<Decimal>,
    pub estado: String,
    pub observacion: Option<String>,
    pub usuario_id: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documento: Option<ArchivoResponse>,
    pub created_at: DateTime<Utc>,
}

impl GastoResponse {
    pub fn from_model(m: gasto::Model, documento: Option<ArchivoResponse>) -> Self {
        Self {
            codigo: codigo_gasto(m.id),
            id: m.id,
            proveedor_id: m.proveedor_id,
            tipo_gasto_id: m.tipo_gasto_id,
            concepto_pago: m.concepto_pago,
            subtotal: m.subtotal,
            porcentaje_iva: m.porcentaje_iva,
            monto_iva: m.monto_iva,
            total: m.total,
            fecha: m.fecha,
            sucursal_id: m.sucursal_id,
            moneda: m.moneda,
            tasa_cambio: m.tasa_cambio,
            estado: m.estado,
            observacion: m.observacion,
            usuario_id: m.usuario_id,
            documento,
            created_at: m.created_at,
        }
    }
}

/// Printable code for a gasto id.
pub fn codigo_gasto(id: i32) -> String {
    format!("G-{:06}", id)
}

/// Printable code for a cotizacion id.
pub fn codigo_cotizacion(id: i32) -> String {
    format!("C-{:06}", id)
}

/// Created cotizacion line.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DetalleResponse {
    pub id: i32,
    pub servicio_productos_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
    pub subtotal: Decimal,
}

impl From<cotizacion_detalle::Model> for DetalleResponse {
    fn from(m: cotizacion_detalle::Model) -> Self {
        Self {
            id: m.id,
            servicio_productos_id: m.servicio_productos_id,
            cantidad: m.cantidad,
            precio_unitario: m.precio_unitario,
            porcentaje_iva: m.porcentaje_iva,
            subtotal: m.subtotal,
        }
    }
}

/// Created cotizacion.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CotizacionResponse {
    pub id: i32,
    pub codigo: String,
    pub cliente_id: i32,
    pub sucursal_id: Option<i32>,
    pub fecha: NaiveDate,
    pub total: Decimal,
    pub estado: String,
    pub observacion: Option<String>,
    pub usuario_id: i32,
    pub detalle: Vec<DetalleResponse>,
    pub created_at: DateTime<Utc>,
}

impl CotizacionResponse {
    pub fn from_model(m: cotizacion::Model, detalle: Vec<cotizacion_detalle::Model>) -> Self {
        Self {
            codigo: codigo_cotizacion(m.id),
            id: m.id,
            cliente_id: m.cliente_id,
            sucursal_id: m.sucursal_id,
            fecha: m.fecha,
            total: m.total,
            estado: m.estado,
            observacion: m.observacion,
            usuario_id: m.usuario_id,
            detalle: detalle.into_iter().map(DetalleResponse::from).collect(),
            created_at: m.created_at,
        }
    }
}

/// Body of `POST /registros/cotizaciones/vista-previa`.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct VistaPreviaRequest {
    #[serde(default, deserialize_with = "texto_flexible")]
    pub cliente_id: Option<String>,
    /// Defaults to today
    #[serde(default, deserialize_with = "texto_flexible")]
    pub fecha: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub observacion: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<Object>>)]
    pub detalle: Option<serde_json::Value>,
}

/// Body returned with 201 by `POST /registros`.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum RegistroResponse {
    Gasto(GastoResponse),
    Cotizacion(CotizacionResponse),
}
