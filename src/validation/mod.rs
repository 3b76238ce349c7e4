//! Request validators.
//!
//! Validators take the persistence [`Gateway`](crate::db::Gateway) and an
//! explicit [`RequestContext`] instead of reading ambient request state.
//! Field checks accumulate into a [`Validacion`] so a rejected request
//! reports every failure at once.

pub mod cliente;
pub mod cuota;
pub mod password;
pub mod proveedor;
pub mod registro;
pub mod repositorio;
pub mod servicio_producto;

use std::str::FromStr;

use actix_web::HttpRequest;
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::AppError;
use crate::models::{AuthContext, monto};

pub use cliente::validar_eliminacion_cliente;
pub use cuota::{resolver_tamano, validar_cuota};
pub use password::validar_password_distinta;
pub use proveedor::validar_proveedor;
pub use registro::{VistaPreviaValidada, validar_registro, validar_vista_previa};
pub use repositorio::{DestinoRepositorio, validar_destino_repositorio};
pub use servicio_producto::validar_servicio_producto;

/// IVA rates accepted anywhere a percentage is entered.
pub const IVA_PERMITIDOS: [u32; 3] = [0, 8, 16];

/// Who is acting, when, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub usuario_id: i32,
    pub rol_id: i32,
    /// Today's date, used to reject future-dated records
    pub hoy: NaiveDate,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    pub fn new(auth: AuthContext, hoy: NaiveDate) -> Self {
        Self {
            usuario_id: auth.usuario_id,
            rol_id: auth.rol_id,
            hoy,
            ip: None,
            user_agent: None,
        }
    }

    /// Build the context for an authenticated request, dated with the local clock.
    pub fn from_request(req: &HttpRequest, auth: AuthContext) -> Self {
        let mut ctx = Self::new(auth, Local::now().date_naive());
        ctx.ip = req.connection_info().realip_remote_addr().map(str::to_string);
        ctx.user_agent = req
            .headers()
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        ctx
    }
}

/// Accumulator for field failures.
#[derive(Debug, Default)]
pub struct Validacion {
    errores: Vec<String>,
}

impl Validacion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, mensaje: impl Into<String>) {
        self.errores.push(mensaje.into());
    }

    /// Keep the value of a passing check, record the message of a failing one.
    pub fn revisar<T>(&mut self, resultado: Result<T, String>) -> Option<T> {
        match resultado {
            Ok(valor) => Some(valor),
            Err(mensaje) => {
                self.errores.push(mensaje);
                None
            }
        }
    }

    pub fn es_valida(&self) -> bool {
        self.errores.is_empty()
    }

    pub fn errores(&self) -> &[String] {
        &self.errores
    }

    /// Log the collected failures and turn them into a 422.
    pub fn into_error(self, contexto: &str) -> AppError {
        warn!(
            contexto = %contexto,
            errores = ?self.errores,
            "Validation failed"
        );
        AppError::validation(self.errores)
    }
}

/// Trimmed value, `None` when absent or blank.
pub(crate) fn presente(valor: &Option<String>) -> Option<&str> {
    valor.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn requerido<'a>(valor: &'a Option<String>, campo: &str) -> Result<&'a str, String> {
    presente(valor).ok_or_else(|| format!("El campo {} es obligatorio", campo))
}

/// Positive integer id.
pub(crate) fn identificador(valor: &str, campo: &str) -> Result<i32, String> {
    valor
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| format!("El campo {} debe ser un identificador válido", campo))
}

pub(crate) fn decimal(valor: &str, campo: &str) -> Result<Decimal, String> {
    Decimal::from_str(valor).map_err(|_| format!("El campo {} debe ser un número válido", campo))
}

/// Amount bound for a `NUMERIC(14, 2)` column.
pub(crate) fn monto_valido(valor: &str, campo: &str) -> Result<Decimal, String> {
    numerico(valor, campo, 2, monto::MONTO_MAXIMO)
}

/// Exchange rate bound for a `NUMERIC(14, 4)` column.
pub(crate) fn tasa_valida(valor: &str, campo: &str) -> Result<Decimal, String> {
    numerico(valor, campo, 4, monto::TASA_MAXIMA)
}

fn numerico(valor: &str, campo: &str, decimales: u32, maximo: Decimal) -> Result<Decimal, String> {
    let numero = decimal(valor, campo)?;
    if numero.normalize().scale() > decimales {
        return Err(format!(
            "El campo {} admite como máximo {} decimales",
            campo, decimales
        ));
    }
    if numero.abs() > maximo {
        return Err(format!("El campo {} excede el máximo permitido", campo));
    }
    Ok(numero)
}

/// `YYYY-MM-DD`, optionally followed by a time part.
pub(crate) fn fecha(valor: &str) -> Result<NaiveDate, String> {
    let solo_fecha = match valor.len() {
        10 => valor,
        n if n > 10 && matches!(valor.as_bytes()[10], b'T' | b' ') => &valor[..10],
        _ => return Err("La fecha debe tener el formato AAAA-MM-DD".to_string()),
    };
    NaiveDate::parse_from_str(solo_fecha, "%Y-%m-%d")
        .map_err(|_| "La fecha debe tener el formato AAAA-MM-DD".to_string())
}

/// IVA must be exactly one of the allowed rates.
pub(crate) fn porcentaje_iva(valor: Decimal, campo: &str) -> Result<Decimal, String> {
    if IVA_PERMITIDOS.iter().any(|p| Decimal::from(*p) == valor) {
        Ok(valor)
    } else {
        Err(format!("El campo {} debe ser 0, 8 o 16", campo))
    }
}
