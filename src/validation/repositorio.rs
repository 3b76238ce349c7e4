//! Destination guard for repository uploads.

use crate::error::{AppError, AppResult};

pub const DESTINO_INVALIDO: &str = "Debe indicar exactamente uno de carpetaId o prefijoS3";

/// Where a repository file lands in the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinoRepositorio {
    Carpeta(i32),
    Prefijo(String),
}

/// Exactly one of `carpetaId` and `prefijoS3` must be present.
///
/// Blank values count as absent. The prefix is returned without leading or
/// trailing slashes.
pub fn validar_destino_repositorio(
    carpeta_id: Option<&str>,
    prefijo_s3: Option<&str>,
) -> AppResult<DestinoRepositorio> {
    let carpeta = carpeta_id.map(str::trim).filter(|v| !v.is_empty());
    let prefijo = prefijo_s3.map(str::trim).filter(|v| !v.is_empty());

    match (carpeta, prefijo) {
        (Some(id), None) => id
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .map(DestinoRepositorio::Carpeta)
            .ok_or_else(|| {
                AppError::InvalidInput("carpetaId debe ser un identificador válido".to_string())
            }),
        (None, Some(prefijo)) => {
            let prefijo = prefijo.trim_matches('/');
            if prefijo.is_empty() || prefijo.split('/').any(|p| p == ".." || p.is_empty()) {
                return Err(AppError::InvalidInput(
                    "prefijoS3 no es una ruta válida".to_string(),
                ));
            }
            Ok(DestinoRepositorio::Prefijo(prefijo.to_string()))
        }
        _ => Err(AppError::InvalidInput(DESTINO_INVALIDO.to_string())),
    }
}
