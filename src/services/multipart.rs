//! Multipart body buffering.
//!
//! Text fields are collected by name and at most one file is buffered in
//! memory. The whole body is bounded by the transport ceiling.

use std::collections::HashMap;

use actix_multipart::Multipart;
use futures_util::StreamExt;

use crate::error::{AppError, AppResult};
use crate::models::ArchivoAdjunto;

/// Buffered multipart form.
#[derive(Debug, Default)]
pub struct FormularioMultipart {
    pub campos: HashMap<String, String>,
    pub archivo: Option<ArchivoAdjunto>,
}

/// Read the whole multipart body, failing once it exceeds `limite` bytes.
pub async fn leer_multipart(
    payload: &mut Multipart,
    limite: usize,
) -> AppResult<FormularioMultipart> {
    let mut formulario = FormularioMultipart::default();
    let mut total: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?;

        let content_disposition = field
            .content_disposition()
            .ok_or_else(|| AppError::InvalidInput("Missing content disposition".to_string()))?;
        let nombre_campo = content_disposition.get_name().unwrap_or_default().to_string();
        let nombre_archivo = content_disposition
            .get_filename()
            .map(|f| f.replace('\\', "/"));
        let content_type = field.content_type().map(|m| m.to_string());

        let mut contenido = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
            total += chunk.len();
            if total > limite {
                return Err(AppError::PayloadTooLarge(format!(
                    "La solicitud supera el límite de {} bytes",
                    limite
                )));
            }
            contenido.extend_from_slice(&chunk);
        }

        match nombre_archivo {
            Some(nombre) => {
                if formulario.archivo.is_some() {
                    return Err(AppError::InvalidInput(
                        "Solo se admite un archivo por solicitud".to_string(),
                    ));
                }
                formulario.archivo = Some(ArchivoAdjunto::new(&nombre, content_type, contenido));
            }
            None => {
                let valor = String::from_utf8(contenido).map_err(|_| {
                    AppError::InvalidInput(format!("El campo {} no es texto UTF-8", nombre_campo))
                })?;
                formulario.campos.insert(nombre_campo, valor);
            }
        }
    }

    Ok(formulario)
}
