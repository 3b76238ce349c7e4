//! Repository file handlers: direct upload, presigned upload and audit trail.

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, web};

use crate::auth::{AuthUser, require_permission};
use crate::config::{FILE_SIZE_HEADER, UploadSettings};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::{
    ArchivoSubidoResponse, EventoArchivoResponse, PresignRequest, PresignResponse, permisos,
};
use crate::services::{Storage, archivos, leer_multipart};
use crate::validation::{
    RequestContext, resolver_tamano, validar_cuota, validar_destino_repositorio,
};

fn header_tamano(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(FILE_SIZE_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// Upload a file to the repository.
///
/// Multipart fields: `archivo` (the file) and exactly one of `carpetaId`
/// or `prefijoS3`.
#[utoipa::path(
    post,
    path = "/api/v1/archivos",
    tag = "Archivos",
    params(
        ("X-File-Size" = Option<i64>, Header, description = "Declared file size for quota accounting")
    ),
    responses(
        (status = 201, description = "File stored", body = ArchivoSubidoResponse),
        (status = 400, description = "Invalid destination", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 413, description = "Quota or size exceeded", body = crate::error::QuotaErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn subir_archivo(
    req: HttpRequest,
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    upload: web::Data<UploadSettings>,
    mut payload: Multipart,
) -> AppResult<HttpResponse> {
    let auth = auth.0;
    require_permission(pool.get_ref(), &auth, permisos::ARCHIVOS_SUBIR).await?;
    let ctx = RequestContext::from_request(&req, auth);

    let formulario = leer_multipart(&mut payload, upload.max_upload_size).await?;
    let campo = |nombre: &str| formulario.campos.get(nombre).map(String::as_str);

    let destino = validar_destino_repositorio(campo("carpetaId"), campo("prefijoS3"))?;
    let tamano = resolver_tamano(
        header_tamano(&req),
        campo("size"),
        formulario.archivo.as_ref().map(|a| a.tamano()),
    )?;
    validar_cuota(
        pool.get_ref(),
        ctx.usuario_id,
        tamano,
        upload.default_quota_bytes,
    )
    .await?;

    let archivo = formulario
        .archivo
        .ok_or_else(|| AppError::validation(vec!["El archivo es obligatorio".to_string()]))?;

    let subido =
        archivos::subir_a_repositorio(pool.get_ref(), storage.get_ref(), &ctx, destino, archivo)
            .await?;

    Ok(HttpResponse::Created().json(subido))
}

/// Issue a presigned PUT URL for a repository file.
#[utoipa::path(
    post,
    path = "/api/v1/archivos/presign",
    tag = "Archivos",
    request_body = PresignRequest,
    params(
        ("X-File-Size" = Option<i64>, Header, description = "Declared file size for quota accounting")
    ),
    responses(
        (status = 201, description = "Presigned URL issued", body = PresignResponse),
        (status = 400, description = "Invalid destination", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 413, description = "Quota exceeded", body = crate::error::QuotaErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn presign_archivo(
    req: HttpRequest,
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    upload: web::Data<UploadSettings>,
    body: web::Json<PresignRequest>,
) -> AppResult<HttpResponse> {
    let auth = auth.0;
    require_permission(pool.get_ref(), &auth, permisos::ARCHIVOS_SUBIR).await?;
    let ctx = RequestContext::from_request(&req, auth);
    let body = body.into_inner();

    let destino =
        validar_destino_repositorio(body.carpeta_id.as_deref(), body.prefijo_s3.as_deref())?;
    let tamano = resolver_tamano(header_tamano(&req), body.size.as_deref(), None)?;
    validar_cuota(
        pool.get_ref(),
        ctx.usuario_id,
        tamano,
        upload.default_quota_bytes,
    )
    .await?;

    let presign = archivos::preparar_presign(
        pool.get_ref(),
        storage.get_ref(),
        &ctx,
        destino,
        &body.nombre,
        tamano,
    )
    .await?;

    Ok(HttpResponse::Created().json(presign))
}

/// Audit trail of a file, oldest first.
#[utoipa::path(
    get,
    path = "/api/v1/archivos/{id}/eventos",
    tag = "Archivos",
    params(
        ("id" = i32, Path, description = "Archivo id")
    ),
    responses(
        (status = 200, description = "Audit events", body = Vec<EventoArchivoResponse>),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "File not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn eventos_archivo(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::ARCHIVOS_VER).await?;
    let archivo_id = path.into_inner();

    pool.get_archivo(archivo_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Archivo {}", archivo_id)))?;

    let eventos: Vec<EventoArchivoResponse> = pool
        .list_eventos_archivo(archivo_id)
        .await?
        .into_iter()
        .map(EventoArchivoResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(eventos))
}

/// Configure repository file routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/archivos/presign").route(web::post().to(presign_archivo)))
        .service(web::resource("/archivos").route(web::post().to(subir_archivo)))
        .service(web::resource("/archivos/{id}/eventos").route(web::get().to(eventos_archivo)));
}
