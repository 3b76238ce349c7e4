//! Record controllers: persist validated gastos and cotizaciones and build
//! the documents rendered from them.

use sea_orm::TransactionTrait;
use serde_json::json;
use tracing::{info, warn};

use crate::db::DbPool;
use crate::db::archivos::{NuevoArchivo, NuevoEvento, insertar_archivo};
use crate::db::registros::insertar_gasto;
use crate::error::{AppError, AppResult};
use crate::models::archivo::ACCION_SUBIDA;
use crate::models::{
    ArchivoResponse, CotizacionResponse, GastoResponse, NuevaCotizacion, NuevoGasto,
    RegistroResponse, RegistroValidado, TipoRegistro,
};
use crate::services::documento::{LineaVista, SolicitudPago, VistaCotizacion};
use crate::services::storage::Storage;
use crate::validation::{RequestContext, VistaPreviaValidada};

/// Persist a validated registro.
pub async fn crear_registro(
    pool: &DbPool,
    storage: &Storage,
    ctx: &RequestContext,
    registro: RegistroValidado,
) -> AppResult<RegistroResponse> {
    match registro {
        RegistroValidado::Gasto(gasto) => crear_gasto(pool, storage, ctx, gasto)
            .await
            .map(RegistroResponse::Gasto),
        RegistroValidado::Cotizacion(cotizacion) => crear_cotizacion(pool, cotizacion)
            .await
            .map(RegistroResponse::Cotizacion),
    }
}

/// Insert the gasto, upload its document and record the file with its
/// audit event.
///
/// Everything runs in one transaction; a failed upload leaves no rows and a
/// failure after the upload removes the uploaded object.
pub async fn crear_gasto(
    pool: &DbPool,
    storage: &Storage,
    ctx: &RequestContext,
    gasto: NuevoGasto,
) -> AppResult<GastoResponse> {
    let txn = pool.connection().begin().await?;

    let model = insertar_gasto(&txn, &gasto).await?;

    let documento = &gasto.documento;
    let ruta_s3 = Storage::gasto_key(model.id, &documento.extension);
    let content_type = documento
        .content_type
        .clone()
        .unwrap_or_else(|| Storage::content_type_for_extension(&documento.extension).to_string());
    storage
        .put(&ruta_s3, documento.contenido.clone(), Some(&content_type))
        .await?;

    let registrar = async {
        let archivo = insertar_archivo(
            &txn,
            &NuevoArchivo {
                registro_tipo: Some(TipoRegistro::Gasto),
                registro_id: Some(model.id),
                carpeta_id: None,
                nombre_original: documento.nombre_original.clone(),
                extension: documento.extension.clone(),
                ruta_s3: ruta_s3.clone(),
                tamano_bytes: i64::try_from(documento.tamano()).unwrap_or(i64::MAX),
                subido_por: ctx.usuario_id,
            },
            &NuevoEvento {
                accion: ACCION_SUBIDA,
                usuario_id: ctx.usuario_id,
                ip: ctx.ip.clone(),
                user_agent: ctx.user_agent.clone(),
                detalles: Some(json!({
                    "registro_tipo": TipoRegistro::Gasto.as_str(),
                    "registro_id": model.id,
                    "content_type": content_type,
                })),
            },
        )
        .await?;
        txn.commit().await?;
        Ok::<_, AppError>(archivo)
    };
    let archivo = deshacer_subida_si_falla(storage, &ruta_s3, registrar).await?;

    info!(
        gasto_id = model.id,
        archivo_id = archivo.id,
        usuario_id = ctx.usuario_id,
        "Gasto created"
    );

    Ok(GastoResponse::from_model(
        model,
        Some(ArchivoResponse::from(archivo)),
    ))
}

/// Await `paso`; when it fails, delete the object already stored at `key`
/// and return the original error.
async fn deshacer_subida_si_falla<T>(
    storage: &Storage,
    key: &str,
    paso: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match paso.await {
        Ok(valor) => Ok(valor),
        Err(e) => {
            if let Err(limpieza) = storage.delete(key).await {
                warn!(key = %key, error = %limpieza, "Orphaned S3 object left after failed insert");
            }
            Err(e)
        }
    }
}

/// Insert the cotizacion and its lines.
pub async fn crear_cotizacion(
    pool: &DbPool,
    cotizacion: NuevaCotizacion,
) -> AppResult<CotizacionResponse> {
    let (model, detalle) = pool.insertar_cotizacion(&cotizacion).await?;

    info!(
        cotizacion_id = model.id,
        lineas = detalle.len(),
        "Cotizacion created"
    );

    Ok(CotizacionResponse::from_model(model, detalle))
}

/// Load everything the solicitud de pago of a gasto shows.
pub async fn cargar_solicitud_pago(pool: &DbPool, gasto_id: i32) -> AppResult<SolicitudPago> {
    let gasto = pool
        .get_gasto(gasto_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Gasto {}", gasto_id)))?;

    let proveedor = match gasto.proveedor_id {
        Some(id) => pool.get_proveedor(id).await?,
        None => None,
    };
    let sucursal = pool
        .get_sucursal(gasto.sucursal_id)
        .await?
        .map(|s| s.nombre)
        .unwrap_or_default();
    let tipo_gasto = pool
        .get_tipo_gasto(gasto.tipo_gasto_id)
        .await?
        .map(|t| t.nombre)
        .unwrap_or_default();
    let solicitante = pool
        .get_usuario(gasto.usuario_id)
        .await?
        .map(|u| u.nombre)
        .unwrap_or_default();

    Ok(SolicitudPago {
        gasto,
        proveedor,
        sucursal,
        tipo_gasto,
        solicitante,
    })
}

/// Resolve client and line descriptions for a validated preview.
pub async fn cargar_vista_cotizacion(
    pool: &DbPool,
    vista: VistaPreviaValidada,
) -> AppResult<VistaCotizacion> {
    let cliente = pool
        .get_cliente(vista.cliente_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cliente {}", vista.cliente_id)))?;

    let ids: Vec<i32> = vista
        .detalle
        .iter()
        .map(|l| l.servicio_productos_id)
        .collect();
    let servicios = pool.servicios_por_id(&ids).await?;

    let lineas = vista
        .detalle
        .into_iter()
        .map(|linea| LineaVista {
            descripcion: servicios
                .get(&linea.servicio_productos_id)
                .map(|s| s.nombre.clone())
                .unwrap_or_else(|| format!("Servicio {}", linea.servicio_productos_id)),
            cantidad: linea.cantidad,
            precio_unitario: linea.precio_unitario,
            porcentaje_iva: linea.porcentaje_iva,
        })
        .collect();

    Ok(VistaCotizacion {
        cliente,
        fecha: vista.fecha,
        lineas,
        observacion: vista.observacion,
    })
}
