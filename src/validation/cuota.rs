//! Storage quota guard.

use crate::db::Gateway;
use crate::error::{AppError, AppResult};

const MIB: f64 = 1024.0 * 1024.0;

/// Pick the declared size of the incoming file.
///
/// Priority: `X-File-Size` header, then the body `size` field, then the
/// size of the attached file. A malformed header or body value is a 400.
pub fn resolver_tamano(
    header: Option<&str>,
    body: Option<&str>,
    archivo: Option<u64>,
) -> AppResult<Option<i64>> {
    for (origen, valor) in [("X-File-Size", header), ("size", body)] {
        if let Some(valor) = valor.map(str::trim).filter(|v| !v.is_empty()) {
            return valor
                .parse::<i64>()
                .ok()
                .filter(|s| *s >= 0)
                .map(Some)
                .ok_or_else(|| {
                    AppError::InvalidInput(format!(
                        "{} debe ser un número entero de bytes",
                        origen
                    ))
                });
        }
    }

    Ok(archivo.map(|s| i64::try_from(s).unwrap_or(i64::MAX)))
}

/// Admit the write iff current usage plus the incoming size fits the quota.
///
/// Without a size there is nothing to check and the gateway is not queried.
pub async fn validar_cuota(
    gateway: &dyn Gateway,
    usuario_id: i32,
    tamano: Option<i64>,
    cuota_por_defecto: i64,
) -> AppResult<()> {
    let Some(tamano) = tamano else {
        return Ok(());
    };

    let usado = gateway.uso_almacenamiento(usuario_id).await?;
    let cuota = gateway
        .cuota_usuario(usuario_id)
        .await?
        .unwrap_or(cuota_por_defecto);

    if usado.saturating_add(tamano) <= cuota {
        return Ok(());
    }

    tracing::warn!(
        usuario_id,
        usado,
        tamano,
        cuota,
        "Upload rejected: storage quota exceeded"
    );
    let disponible = (cuota - usado).max(0);
    Err(AppError::QuotaExceeded(format!(
        "Has superado tu cuota de almacenamiento: el archivo ocupa {:.2} MB y solo quedan {:.2} MB disponibles de {:.2} MB",
        tamano as f64 / MIB,
        disponible as f64 / MIB,
        cuota as f64 / MIB
    )))
}
