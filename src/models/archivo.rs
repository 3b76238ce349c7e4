//! Uploaded file models.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::texto_flexible;
use crate::entity::{archivo, evento_archivo};

/// Extensions accepted for gasto documents.
pub const EXTENSIONES_GASTO: &[&str] = &["pdf", "png", "jpg", "jpeg", "webp"];

/// Extensions accepted for repository uploads, signatures and receipts.
pub const EXTENSIONES_GENERALES: &[&str] = &["pdf", "png", "jpg", "jpeg"];

/// Audit action recorded when a file is stored.
pub const ACCION_SUBIDA: &str = "subida";

/// Audit action recorded when a presigned upload URL is issued.
pub const ACCION_PRESIGN: &str = "presign";

/// A file received in a multipart body, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivoAdjunto {
    /// Client file name, without any directory components
    pub nombre_original: String,
    /// Lowercased extension without the dot; empty when the name has none
    pub extension: String,
    pub content_type: Option<String>,
    pub contenido: Vec<u8>,
}

impl ArchivoAdjunto {
    pub fn new(nombre: &str, content_type: Option<String>, contenido: Vec<u8>) -> Self {
        let nombre_original = nombre_base(nombre);
        let extension = extension_de(&nombre_original);
        Self {
            nombre_original,
            extension,
            content_type,
            contenido,
        }
    }

    pub fn tamano(&self) -> u64 {
        self.contenido.len() as u64
    }

    pub fn extension_permitida(&self, permitidas: &[&str]) -> bool {
        permitidas.contains(&self.extension.as_str())
    }
}

/// Strip any client-side directory from an uploaded file name.
pub fn nombre_base(nombre: &str) -> String {
    nombre
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(nombre)
        .trim()
        .to_string()
}

/// Lowercased extension of a file name.
pub fn extension_de(nombre: &str) -> String {
    Path::new(nombre)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Stored file reference.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ArchivoResponse {
    pub id: i32,
    pub nombre_original: String,
    pub extension: String,
    pub ruta_s3: String,
    pub tamano_bytes: i64,
    pub created_at: DateTime<Utc>,
}

impl From<archivo::Model> for ArchivoResponse {
    fn from(m: archivo::Model) -> Self {
        Self {
            id: m.id,
            nombre_original: m.nombre_original,
            extension: m.extension,
            ruta_s3: m.ruta_s3,
            tamano_bytes: m.tamano_bytes,
            created_at: m.created_at,
        }
    }
}

/// Body returned after a repository upload.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArchivoSubidoResponse {
    pub id_archivo: i32,
    pub ruta_s3: String,
}

/// Request for a presigned repository upload.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub nombre: String,
    /// Declared size in bytes
    #[serde(default, deserialize_with = "texto_flexible")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub carpeta_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    pub prefijo_s3: Option<String>,
}

/// Presigned PUT URL plus the file record it will fill.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub id_archivo: i32,
    pub ruta_s3: String,
    pub url: String,
    pub expira_en_segundos: u64,
}

/// Audit trail entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventoArchivoResponse {
    pub id: i32,
    pub archivo_id: i32,
    pub accion: String,
    pub usuario_id: i32,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub detalles: Option<serde_json::Value>,
    pub fecha: DateTime<Utc>,
}

impl From<evento_archivo::Model> for EventoArchivoResponse {
    fn from(m: evento_archivo::Model) -> Self {
        Self {
            id: m.id,
            archivo_id: m.archivo_id,
            accion: m.accion,
            usuario_id: m.usuario_id,
            ip: m.ip,
            user_agent: m.user_agent,
            detalles: m.detalles,
            fecha: m.created_at,
        }
    }
}
