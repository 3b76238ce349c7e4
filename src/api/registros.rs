//! Registro API handlers: creation of gastos and cotizaciones and the PDF
//! documents built from them.

use actix_multipart::Multipart;
use actix_web::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use actix_web::{HttpRequest, HttpResponse, web};
use futures_util::StreamExt;

use crate::auth::{AuthUser, require_permission};
use crate::config::{FILE_SIZE_HEADER, UploadSettings};
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::registro::codigo_gasto;
use crate::models::{RegistroInput, RegistroResponse, VistaPreviaRequest, permisos};
use crate::services::documento::{cotizacion_html, solicitud_pago_html};
use crate::services::{PdfRenderer, Storage, leer_multipart, registros};
use crate::validation::{
    RequestContext, resolver_tamano, validar_cuota, validar_registro, validar_vista_previa,
};

fn es_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().starts_with("multipart/form-data"))
}

/// Buffer a raw body, failing once it exceeds `limite` bytes.
async fn leer_cuerpo(mut payload: web::Payload, limite: usize) -> AppResult<web::BytesMut> {
    let mut cuerpo = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?;
        if cuerpo.len() + chunk.len() > limite {
            return Err(AppError::PayloadTooLarge(format!(
                "La solicitud supera el límite de {} bytes",
                limite
            )));
        }
        cuerpo.extend_from_slice(&chunk);
    }
    Ok(cuerpo)
}

fn pdf_response(nombre: &str, pdf: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{}.pdf\"", nombre),
        ))
        .body(pdf)
}

/// Create a gasto or a cotizacion.
///
/// Accepts `multipart/form-data` (text fields plus the `documento` file of a
/// gasto) or a JSON body. The body is discriminated by `tipo`.
#[utoipa::path(
    post,
    path = "/api/v1/registros",
    tag = "Registros",
    request_body(content = RegistroInput, content_type = "multipart/form-data"),
    params(
        ("X-File-Size" = Option<i64>, Header, description = "Declared file size for quota accounting")
    ),
    responses(
        (status = 201, description = "Registro created", body = RegistroResponse),
        (status = 400, description = "Missing or unknown tipo", body = crate::error::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing permission", body = crate::error::ErrorResponse),
        (status = 413, description = "Quota or size exceeded", body = crate::error::QuotaErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn crear_registro(
    req: HttpRequest,
    auth: AuthUser,
    pool: web::Data<DbPool>,
    storage: web::Data<Storage>,
    upload: web::Data<UploadSettings>,
    payload: web::Payload,
) -> AppResult<HttpResponse> {
    let auth = auth.0;
    require_permission(pool.get_ref(), &auth, permisos::REGISTROS_CREAR).await?;
    let ctx = RequestContext::from_request(&req, auth);

    let (input, documento) = if es_multipart(&req) {
        let mut multipart = Multipart::new(req.headers(), payload);
        let formulario = leer_multipart(&mut multipart, upload.max_upload_size).await?;
        (
            RegistroInput::from_campos(&formulario.campos)?,
            formulario.archivo,
        )
    } else {
        let cuerpo = leer_cuerpo(payload, upload.max_upload_size).await?;
        (serde_json::from_slice::<RegistroInput>(&cuerpo)?, None)
    };

    let tamano = resolver_tamano(
        req.headers()
            .get(FILE_SIZE_HEADER)
            .and_then(|v| v.to_str().ok()),
        input.size.as_deref(),
        documento.as_ref().map(|d| d.tamano()),
    )?;
    validar_cuota(
        pool.get_ref(),
        ctx.usuario_id,
        tamano,
        upload.default_quota_bytes,
    )
    .await?;

    let validado = validar_registro(pool.get_ref(), &ctx, &input, documento).await?;
    let creado = registros::crear_registro(pool.get_ref(), storage.get_ref(), &ctx, validado).await?;

    Ok(HttpResponse::Created().json(creado))
}

/// Render a cotizacion preview as PDF without storing anything.
#[utoipa::path(
    post,
    path = "/api/v1/registros/cotizaciones/vista-previa",
    tag = "Registros",
    request_body = VistaPreviaRequest,
    responses(
        (status = 200, description = "PDF preview", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 422, description = "Validation failed", body = crate::error::ValidationErrorResponse),
        (status = 500, description = "Rendering failed", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn vista_previa_cotizacion(
    req: HttpRequest,
    auth: AuthUser,
    pool: web::Data<DbPool>,
    renderer: web::Data<PdfRenderer>,
    body: web::Json<VistaPreviaRequest>,
) -> AppResult<HttpResponse> {
    let auth = auth.0;
    require_permission(pool.get_ref(), &auth, permisos::REGISTROS_CREAR).await?;
    let ctx = RequestContext::from_request(&req, auth);

    let validada = validar_vista_previa(pool.get_ref(), &ctx, &body).await?;
    let vista = registros::cargar_vista_cotizacion(pool.get_ref(), validada).await?;
    let pdf = renderer.render(&cotizacion_html(&vista)?).await?;

    Ok(pdf_response("vista-previa-cotizacion", pdf))
}

/// Render the solicitud de pago of a gasto as PDF.
#[utoipa::path(
    get,
    path = "/api/v1/registros/gastos/{id}/solicitud",
    tag = "Registros",
    params(
        ("id" = i32, Path, description = "Gasto id")
    ),
    responses(
        (status = 200, description = "Solicitud de pago PDF", content_type = "application/pdf"),
        (status = 401, description = "Unauthorized", body = crate::error::ErrorResponse),
        (status = 404, description = "Gasto not found", body = crate::error::ErrorResponse),
    ),
    security(("bearer" = []))
)]
pub async fn solicitud_pago(
    auth: AuthUser,
    pool: web::Data<DbPool>,
    renderer: web::Data<PdfRenderer>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    require_permission(pool.get_ref(), &auth.0, permisos::REGISTROS_VER).await?;
    let gasto_id = path.into_inner();

    let solicitud = registros::cargar_solicitud_pago(pool.get_ref(), gasto_id).await?;
    let pdf = renderer.render(&solicitud_pago_html(&solicitud)).await?;

    Ok(pdf_response(
        &format!("solicitud-{}", codigo_gasto(gasto_id)),
        pdf,
    ))
}

/// Configure registro routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/registros").route(web::post().to(crear_registro)))
        .service(
            web::resource("/registros/cotizaciones/vista-previa")
                .route(web::post().to(vista_previa_cotizacion)),
        )
        .service(
            web::resource("/registros/gastos/{id}/solicitud").route(web::get().to(solicitud_pago)),
        );
}
