//! Repository uploads: direct multipart uploads and presigned PUT URLs.

use serde_json::json;
use tracing::info;

use crate::db::DbPool;
use crate::db::archivos::{NuevoArchivo, NuevoEvento};
use crate::error::{AppError, AppResult};
use crate::models::archivo::{
    ACCION_PRESIGN, ACCION_SUBIDA, EXTENSIONES_GENERALES, extension_de, nombre_base,
};
use crate::models::{ArchivoAdjunto, ArchivoSubidoResponse, PresignResponse};
use crate::services::storage::{PRESIGN_EXPIRACION, Storage};
use crate::validation::{DestinoRepositorio, RequestContext};

pub const EXTENSION_NO_PERMITIDA: &str = "El archivo debe ser PDF, PNG, JPG o JPEG";

/// Extension of a repository file, restricted to the general allow-list.
pub fn extension_repositorio(nombre: &str) -> AppResult<String> {
    let extension = extension_de(nombre);
    if EXTENSIONES_GENERALES.contains(&extension.as_str()) {
        Ok(extension)
    } else {
        Err(AppError::validation(vec![EXTENSION_NO_PERMITIDA.to_string()]))
    }
}

/// Bucket prefix for a destination; a folder id must exist.
async fn resolver_prefijo(pool: &DbPool, destino: &DestinoRepositorio) -> AppResult<(String, Option<i32>)> {
    match destino {
        DestinoRepositorio::Carpeta(id) => {
            let carpeta = pool
                .get_carpeta(*id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Carpeta {}", id)))?;
            Ok((carpeta.prefijo_s3, Some(carpeta.id)))
        }
        DestinoRepositorio::Prefijo(prefijo) => Ok((prefijo.clone(), None)),
    }
}

fn evento(accion: &'static str, ctx: &RequestContext, detalles: serde_json::Value) -> NuevoEvento {
    NuevoEvento {
        accion,
        usuario_id: ctx.usuario_id,
        ip: ctx.ip.clone(),
        user_agent: ctx.user_agent.clone(),
        detalles: Some(detalles),
    }
}

/// Store an uploaded file under the destination and record it.
pub async fn subir_a_repositorio(
    pool: &DbPool,
    storage: &Storage,
    ctx: &RequestContext,
    destino: DestinoRepositorio,
    archivo: ArchivoAdjunto,
) -> AppResult<ArchivoSubidoResponse> {
    let extension = extension_repositorio(&archivo.nombre_original)?;
    let (prefijo, carpeta_id) = resolver_prefijo(pool, &destino).await?;

    let ruta_s3 = Storage::repositorio_key(&prefijo, &extension);
    let content_type = archivo
        .content_type
        .clone()
        .unwrap_or_else(|| Storage::content_type_for_extension(&extension).to_string());
    let tamano_bytes = i64::try_from(archivo.tamano()).unwrap_or(i64::MAX);

    storage
        .put(&ruta_s3, archivo.contenido, Some(&content_type))
        .await?;

    let registro = pool
        .insertar_archivo(
            &NuevoArchivo {
                registro_tipo: None,
                registro_id: None,
                carpeta_id,
                nombre_original: archivo.nombre_original,
                extension,
                ruta_s3: ruta_s3.clone(),
                tamano_bytes,
                subido_por: ctx.usuario_id,
            },
            &evento(ACCION_SUBIDA, ctx, json!({ "content_type": content_type })),
        )
        .await?;

    info!(
        archivo_id = registro.id,
        ruta_s3 = %ruta_s3,
        tamano_bytes,
        "Repository file uploaded"
    );

    Ok(ArchivoSubidoResponse {
        id_archivo: registro.id,
        ruta_s3,
    })
}

/// Record a file the client will PUT directly and return the signed URL.
pub async fn preparar_presign(
    pool: &DbPool,
    storage: &Storage,
    ctx: &RequestContext,
    destino: DestinoRepositorio,
    nombre: &str,
    tamano: Option<i64>,
) -> AppResult<PresignResponse> {
    let nombre_original = nombre_base(nombre);
    if nombre_original.is_empty() {
        return Err(AppError::validation(vec![
            "El campo nombre es obligatorio".to_string(),
        ]));
    }
    let extension = extension_repositorio(&nombre_original)?;
    let (prefijo, carpeta_id) = resolver_prefijo(pool, &destino).await?;

    let ruta_s3 = Storage::repositorio_key(&prefijo, &extension);
    let content_type = Storage::content_type_for_extension(&extension);
    let url = storage.presign_put(&ruta_s3, content_type).await?;

    let registro = pool
        .insertar_archivo(
            &NuevoArchivo {
                registro_tipo: None,
                registro_id: None,
                carpeta_id,
                nombre_original,
                extension,
                ruta_s3: ruta_s3.clone(),
                tamano_bytes: tamano.unwrap_or(0),
                subido_por: ctx.usuario_id,
            },
            &evento(
                ACCION_PRESIGN,
                ctx,
                json!({
                    "content_type": content_type,
                    "expira_en_segundos": PRESIGN_EXPIRACION.as_secs(),
                }),
            ),
        )
        .await?;

    Ok(PresignResponse {
        id_archivo: registro.id,
        ruta_s3,
        url,
        expira_en_segundos: PRESIGN_EXPIRACION.as_secs(),
    })
}
