//! Server-side checks for the provider form.

use std::sync::LazyLock;

use regex::Regex;

use super::{Validacion, presente, requerido};
use crate::db::Gateway;
use crate::error::AppResult;
use crate::models::{NuevoProveedor, ProveedorInput};

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Venezuelan company tax id.
static RIF_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^J-\d{9}$").unwrap());

pub const PROVEEDOR_DUPLICADO: &str =
    "Ya existe un proveedor con el mismo nombre, email y teléfono";

/// Validate a provider and check for an existing (nombre, email, telefono) match.
pub async fn validar_proveedor(
    gateway: &dyn Gateway,
    input: &ProveedorInput,
) -> AppResult<NuevoProveedor> {
    let mut v = Validacion::new();

    let nombre = v
        .revisar(requerido(&input.nombre, "nombre"))
        .map(str::to_string);

    let email = presente(&input.email).map(str::to_string);
    if let Some(email) = &email
        && !EMAIL_REGEX.is_match(email)
    {
        v.error("El email no tiene un formato válido");
    }

    let rif = v
        .revisar(requerido(&input.rif, "rif"))
        .and_then(|rif| {
            if RIF_REGEX.is_match(rif) {
                Some(rif.to_string())
            } else {
                v.error("El RIF debe tener el formato J-#########");
                None
            }
        });

    let telefono = presente(&input.telefono).map(str::to_string);

    if let Some(nombre) = &nombre
        && gateway
            .proveedor_duplicado(nombre, email.as_deref(), telefono.as_deref())
            .await?
    {
        v.error(PROVEEDOR_DUPLICADO);
    }

    match (nombre, rif) {
        (Some(nombre), Some(rif)) if v.es_valida() => Ok(NuevoProveedor {
            nombre,
            email,
            telefono,
            direccion: presente(&input.direccion).map(str::to_string),
            rif,
            banco: presente(&input.banco).map(str::to_string),
            numero_cuenta: presente(&input.numero_cuenta).map(str::to_string),
        }),
        _ => Err(v.into_error("proveedor")),
    }
}
