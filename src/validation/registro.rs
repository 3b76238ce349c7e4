//! Field validator chain for registros (`gasto` | `cotizacion`).
//!
//! Dispatches on `tipo`, runs the common checks and then the checks of the
//! variant, consulting the gateway once per existence or duplicate check.
//! Nothing is written here; the caller receives a [`RegistroValidado`] or a
//! 422 carrying every failure.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use super::{
    RequestContext, Validacion, decimal, fecha, identificador, monto_valido, porcentaje_iva,
    presente, requerido, tasa_valida,
};
use crate::db::{ClaveGasto, Gateway};
use crate::error::{AppError, AppResult};
use crate::models::archivo::EXTENSIONES_GASTO;
use crate::models::monto::{self, CANTIDAD_MAXIMA};
use crate::models::texto_flexible;
use crate::models::{
    ArchivoAdjunto, DetalleValidado, Moneda, NuevaCotizacion, NuevoGasto, RegistroInput,
    RegistroValidado, TipoRegistro, VistaPreviaRequest,
};

/// Expense type for which a provider is mandatory.
pub const TIPO_GASTO_OPERATIVO_ID: i32 = 1;

/// Size ceiling for gasto documents.
pub const TAMANO_MAXIMO_DOCUMENTO: u64 = 2 * 1024 * 1024;

/// User-facing messages.
pub mod mensajes {
    pub const TIPO_INVALIDO: &str =
        "El campo tipo es obligatorio y debe ser 'gasto' o 'cotizacion'";
    pub const FECHA_FUTURA: &str = "La fecha no puede ser posterior a la fecha actual";
    pub const SUCURSAL_NO_EXISTE: &str = "La sucursal indicada no existe";
    pub const USUARIO_NO_EXISTE: &str = "El usuario indicado no existe";
    pub const TIPO_GASTO_NO_EXISTE: &str = "El tipo de gasto indicado no existe";
    pub const PROVEEDOR_NO_EXISTE: &str = "El proveedor indicado no existe";
    pub const PROVEEDOR_OBLIGATORIO: &str = "El proveedor es obligatorio para gastos operativos";
    pub const SUBTOTAL_POSITIVO: &str = "El subtotal debe ser mayor a cero";
    pub const MONEDA_INVALIDA: &str = "La moneda debe ser USD o VES";
    pub const TASA_CAMBIO_OBLIGATORIA: &str =
        "La tasa de cambio es obligatoria cuando la moneda es VES";
    pub const TASA_CAMBIO_POSITIVA: &str = "La tasa de cambio debe ser mayor a cero";
    pub const DOCUMENTO_OBLIGATORIO: &str = "El documento del gasto es obligatorio";
    pub const DOCUMENTO_EXTENSION: &str =
        "El documento debe ser un archivo PDF, PNG, JPG, JPEG o WEBP";
    pub const DOCUMENTO_TAMANO: &str = "El documento no puede superar los 2 MB";
    pub const GASTO_DUPLICADO: &str =
        "Ya existe un gasto con el mismo proveedor, concepto de pago, subtotal, fecha y sucursal";
    pub const CLIENTE_OBLIGATORIO: &str = "El cliente es obligatorio";
    pub const CLIENTE_NO_EXISTE: &str = "El cliente indicado no existe";
    pub const TOTAL_POSITIVO: &str = "El total debe ser mayor a cero";
    pub const TOTAL_EXCEDIDO: &str = "El total del gasto con IVA excede el máximo permitido";
    pub const DETALLE_VACIO: &str = "La cotización debe incluir al menos un servicio o producto";
    pub const DETALLE_INVALIDO: &str = "El detalle debe ser una lista de servicios o productos";
    pub const COTIZACION_DUPLICADA: &str =
        "Ya existe una cotización para este cliente con la misma fecha y total";

    pub fn archivo_duplicado(nombre: &str) -> String {
        format!("Ya existe un archivo con el nombre '{}'", nombre)
    }
}

/// Validate a registro and normalize it for the controllers.
///
/// An absent or unknown `tipo` fails with 400 before the gateway is touched.
pub async fn validar_registro(
    gateway: &dyn Gateway,
    ctx: &RequestContext,
    input: &RegistroInput,
    documento: Option<ArchivoAdjunto>,
) -> AppResult<RegistroValidado> {
    let tipo = input
        .tipo
        .as_deref()
        .and_then(TipoRegistro::parse)
        .ok_or_else(|| AppError::InvalidInput(mensajes::TIPO_INVALIDO.to_string()))?;

    let mut v = Validacion::new();
    let comunes = validar_comunes(gateway, ctx, input, tipo, &mut v).await?;

    let validado = match tipo {
        TipoRegistro::Gasto => validar_gasto(gateway, input, &comunes, documento, &mut v)
            .await?
            .map(RegistroValidado::Gasto),
        TipoRegistro::Cotizacion => validar_cotizacion(gateway, input, &comunes, &mut v)
            .await?
            .map(RegistroValidado::Cotizacion),
    };

    match validado {
        Some(registro) if v.es_valida() => Ok(registro),
        _ => Err(v.into_error(tipo.as_str())),
    }
}

/// Values shared by both variants.
struct Comunes {
    fecha: Option<NaiveDate>,
    sucursal_id: Option<i32>,
    usuario_id: Option<i32>,
    observacion: Option<String>,
}

async fn validar_comunes(
    gateway: &dyn Gateway,
    ctx: &RequestContext,
    input: &RegistroInput,
    tipo: TipoRegistro,
    v: &mut Validacion,
) -> AppResult<Comunes> {
    let fecha = v
        .revisar(requerido(&input.fecha, "fecha").and_then(fecha))
        .and_then(|f| {
            if f > ctx.hoy {
                v.error(mensajes::FECHA_FUTURA);
                None
            } else {
                Some(f)
            }
        });

    let sucursal_id = match presente(&input.sucursal_id) {
        Some(valor) => match v.revisar(identificador(valor, "sucursal_id")) {
            Some(id) if gateway.sucursal_existe(id).await? => Some(id),
            Some(_) => {
                v.error(mensajes::SUCURSAL_NO_EXISTE);
                None
            }
            None => None,
        },
        None => {
            if tipo == TipoRegistro::Gasto {
                v.error("El campo sucursal_id es obligatorio");
            }
            None
        }
    };

    let usuario_id = match presente(&input.usuario_id) {
        Some(valor) => match v.revisar(identificador(valor, "usuario_id")) {
            Some(id) if gateway.usuario_existe(id).await? => Some(id),
            Some(_) => {
                v.error(mensajes::USUARIO_NO_EXISTE);
                None
            }
            None => None,
        },
        None => Some(ctx.usuario_id),
    };

    Ok(Comunes {
        fecha,
        sucursal_id,
        usuario_id,
        observacion: presente(&input.observacion).map(str::to_string),
    })
}

async fn validar_gasto(
    gateway: &dyn Gateway,
    input: &RegistroInput,
    comunes: &Comunes,
    documento: Option<ArchivoAdjunto>,
    v: &mut Validacion,
) -> AppResult<Option<NuevoGasto>> {
    let tipo_gasto = v.revisar(
        requerido(&input.tipo_gasto_id, "tipo_gasto_id")
            .and_then(|s| identificador(s, "tipo_gasto_id")),
    );
    let tipo_gasto_id = match tipo_gasto {
        Some(id) if gateway.tipo_gasto_existe(id).await? => Some(id),
        Some(_) => {
            v.error(mensajes::TIPO_GASTO_NO_EXISTE);
            None
        }
        None => None,
    };

    let concepto_pago = v
        .revisar(requerido(&input.concepto_pago, "concepto_pago"))
        .map(str::to_string);

    let subtotal = v
        .revisar(requerido(&input.subtotal, "subtotal").and_then(|s| monto_valido(s, "subtotal")))
        .and_then(|s| {
            if s > Decimal::ZERO {
                Some(s)
            } else {
                v.error(mensajes::SUBTOTAL_POSITIVO);
                None
            }
        });

    let porcentaje = match presente(&input.porcentaje_iva) {
        Some(valor) => v.revisar(
            decimal(valor, "porcentaje_iva").and_then(|p| porcentaje_iva(p, "porcentaje_iva")),
        ),
        None => Some(Decimal::ZERO),
    };

    if let (Some(subtotal), Some(porcentaje)) = (subtotal, porcentaje) {
        let total = monto::iva(subtotal, porcentaje).and_then(|iva| monto::sumar(subtotal, iva));
        if !total.is_ok_and(monto::cabe_en_columna) {
            v.error(mensajes::TOTAL_EXCEDIDO);
        }
    }

    let moneda = v
        .revisar(requerido(&input.moneda, "moneda"))
        .and_then(|m| {
            let parsed = Moneda::parse(m);
            if parsed.is_none() {
                v.error(mensajes::MONEDA_INVALIDA);
            }
            parsed
        });

    let tasa_cambio = match presente(&input.tasa_cambio) {
        Some(valor) => match v.revisar(tasa_valida(valor, "tasa_cambio")) {
            Some(t) if t > Decimal::ZERO => Some(Some(t)),
            Some(_) => {
                v.error(mensajes::TASA_CAMBIO_POSITIVA);
                None
            }
            None => None,
        },
        None => {
            if moneda == Some(Moneda::Ves) {
                v.error(mensajes::TASA_CAMBIO_OBLIGATORIA);
                None
            } else {
                Some(None)
            }
        }
    };

    let proveedor_id = match presente(&input.proveedor_id) {
        Some(valor) => match v.revisar(identificador(valor, "proveedor_id")) {
            Some(id) if gateway.proveedor_existe(id).await? => Some(Some(id)),
            Some(_) => {
                v.error(mensajes::PROVEEDOR_NO_EXISTE);
                None
            }
            None => None,
        },
        None => {
            if tipo_gasto == Some(TIPO_GASTO_OPERATIVO_ID) {
                v.error(mensajes::PROVEEDOR_OBLIGATORIO);
                None
            } else {
                Some(None)
            }
        }
    };

    let documento = match documento {
        Some(doc) => validar_documento(gateway, doc, v).await?,
        None => {
            v.error(mensajes::DOCUMENTO_OBLIGATORIO);
            None
        }
    };

    if let (Some(proveedor_id), Some(concepto_pago), Some(subtotal), Some(fecha), Some(sucursal_id)) = (
        proveedor_id,
        concepto_pago.as_ref(),
        subtotal,
        comunes.fecha,
        comunes.sucursal_id,
    ) {
        let clave = ClaveGasto {
            proveedor_id,
            concepto_pago: concepto_pago.clone(),
            subtotal,
            fecha,
            sucursal_id,
        };
        if gateway.gasto_duplicado(&clave).await? {
            v.error(mensajes::GASTO_DUPLICADO);
        }
    }

    let gasto = match (
        tipo_gasto_id,
        concepto_pago,
        subtotal,
        porcentaje,
        moneda,
        tasa_cambio,
        proveedor_id,
        documento,
        comunes.fecha,
        comunes.sucursal_id,
        comunes.usuario_id,
    ) {
        (
            Some(tipo_gasto_id),
            Some(concepto_pago),
            Some(subtotal),
            Some(porcentaje_iva),
            Some(moneda),
            Some(tasa_cambio),
            Some(proveedor_id),
            Some(documento),
            Some(fecha),
            Some(sucursal_id),
            Some(usuario_id),
        ) => Some(NuevoGasto {
            proveedor_id,
            tipo_gasto_id,
            concepto_pago,
            subtotal,
            porcentaje_iva,
            fecha,
            sucursal_id,
            moneda,
            tasa_cambio,
            observacion: comunes.observacion.clone(),
            usuario_id,
            documento,
        }),
        _ => None,
    };

    Ok(gasto)
}

/// Extension allow-list, size ceiling and exact-name duplicate check.
async fn validar_documento(
    gateway: &dyn Gateway,
    documento: ArchivoAdjunto,
    v: &mut Validacion,
) -> AppResult<Option<ArchivoAdjunto>> {
    let mut valido = true;

    if !documento.extension_permitida(EXTENSIONES_GASTO) {
        v.error(mensajes::DOCUMENTO_EXTENSION);
        valido = false;
    }
    if documento.tamano() > TAMANO_MAXIMO_DOCUMENTO {
        v.error(mensajes::DOCUMENTO_TAMANO);
        valido = false;
    }
    if gateway
        .nombre_archivo_existe(&documento.nombre_original)
        .await?
    {
        v.error(mensajes::archivo_duplicado(&documento.nombre_original));
        valido = false;
    }

    Ok(valido.then_some(documento))
}

async fn validar_cotizacion(
    gateway: &dyn Gateway,
    input: &RegistroInput,
    comunes: &Comunes,
    v: &mut Validacion,
) -> AppResult<Option<NuevaCotizacion>> {
    let cliente_id = match presente(&input.cliente_id) {
        Some(valor) => match v.revisar(identificador(valor, "cliente_id")) {
            Some(id) if gateway.cliente_existe(id).await? => Some(id),
            Some(_) => {
                v.error(mensajes::CLIENTE_NO_EXISTE);
                None
            }
            None => None,
        },
        None => {
            v.error(mensajes::CLIENTE_OBLIGATORIO);
            None
        }
    };

    let total = v
        .revisar(requerido(&input.total, "total").and_then(|s| monto_valido(s, "total")))
        .and_then(|t| {
            if t > Decimal::ZERO {
                Some(t)
            } else {
                v.error(mensajes::TOTAL_POSITIVO);
                None
            }
        });

    let detalle = validar_detalle(gateway, input.detalle.as_ref(), v).await?;

    if let (Some(cliente_id), Some(fecha), Some(total)) = (cliente_id, comunes.fecha, total)
        && gateway.cotizacion_duplicada(cliente_id, fecha, total).await?
    {
        v.error(mensajes::COTIZACION_DUPLICADA);
    }

    let cotizacion = match (cliente_id, comunes.fecha, total, detalle, comunes.usuario_id) {
        (Some(cliente_id), Some(fecha), Some(total), Some(detalle), Some(usuario_id)) => {
            Some(NuevaCotizacion {
                cliente_id,
                sucursal_id: comunes.sucursal_id,
                fecha,
                total,
                detalle,
                observacion: comunes.observacion.clone(),
                usuario_id,
            })
        }
        _ => None,
    };

    Ok(cotizacion)
}

/// Cotizacion preview input after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct VistaPreviaValidada {
    pub cliente_id: i32,
    pub fecha: NaiveDate,
    pub detalle: Vec<DetalleValidado>,
    pub observacion: Option<String>,
}

/// Validate the body of a cotizacion preview.
///
/// Same client and line checks as a cotizacion, without the total or the
/// duplicate check; `fecha` defaults to today.
pub async fn validar_vista_previa(
    gateway: &dyn Gateway,
    ctx: &RequestContext,
    input: &VistaPreviaRequest,
) -> AppResult<VistaPreviaValidada> {
    let mut v = Validacion::new();

    let cliente_id = match presente(&input.cliente_id) {
        Some(valor) => match v.revisar(identificador(valor, "cliente_id")) {
            Some(id) if gateway.cliente_existe(id).await? => Some(id),
            Some(_) => {
                v.error(mensajes::CLIENTE_NO_EXISTE);
                None
            }
            None => None,
        },
        None => {
            v.error(mensajes::CLIENTE_OBLIGATORIO);
            None
        }
    };

    let fecha = match presente(&input.fecha) {
        Some(valor) => v.revisar(fecha(valor)),
        None => Some(ctx.hoy),
    };

    let detalle = validar_detalle(gateway, input.detalle.as_ref(), &mut v).await?;

    match (cliente_id, fecha, detalle) {
        (Some(cliente_id), Some(fecha), Some(detalle)) if v.es_valida() => {
            Ok(VistaPreviaValidada {
                cliente_id,
                fecha,
                detalle,
                observacion: presente(&input.observacion).map(str::to_string),
            })
        }
        _ => Err(v.into_error("vista_previa")),
    }
}

/// One raw cotizacion line.
#[derive(Debug, Default, Deserialize)]
struct LineaInput {
    #[serde(default, deserialize_with = "texto_flexible")]
    servicio_productos_id: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    cantidad: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    precio_unitario: Option<String>,
    #[serde(default, deserialize_with = "texto_flexible")]
    porcentaje_iva: Option<String>,
}

/// Validate cotizacion lines.
///
/// `valor` may be a JSON array or the JSON text of one (multipart flow).
/// Returns `None` when any line failed; the failures are in `v`.
pub(crate) async fn validar_detalle(
    gateway: &dyn Gateway,
    valor: Option<&Value>,
    v: &mut Validacion,
) -> AppResult<Option<Vec<DetalleValidado>>> {
    let Some(items) = v.revisar(leer_lineas(valor)) else {
        return Ok(None);
    };

    let mut detalle = Vec::with_capacity(items.len());
    let mut completo = true;

    for (indice, item) in items.into_iter().enumerate() {
        let n = indice + 1;
        let linea: LineaInput = match serde_json::from_value(item) {
            Ok(linea) => linea,
            Err(_) => {
                v.error(format!("Detalle {}: formato inválido", n));
                completo = false;
                continue;
            }
        };

        let servicio = match v.revisar(
            requerido(&linea.servicio_productos_id, "servicio_productos_id")
                .and_then(|s| identificador(s, "servicio_productos_id"))
                .map_err(|e| format!("Detalle {}: {}", n, e)),
        ) {
            Some(id) if gateway.servicio_producto_existe(id).await? => Some(id),
            Some(id) => {
                v.error(format!(
                    "Detalle {}: el servicio o producto {} no existe",
                    n, id
                ));
                None
            }
            None => None,
        };

        let cantidad = v.revisar(
            requerido(&linea.cantidad, "cantidad")
                .and_then(|s| {
                    let cantidad = s
                        .parse::<i32>()
                        .ok()
                        .filter(|c| *c > 0)
                        .ok_or_else(|| "la cantidad debe ser un entero mayor a cero".to_string())?;
                    if cantidad > CANTIDAD_MAXIMA {
                        return Err(format!("la cantidad no puede superar {}", CANTIDAD_MAXIMA));
                    }
                    Ok(cantidad)
                })
                .map_err(|e| format!("Detalle {}: {}", n, e)),
        );

        let precio = v.revisar(
            requerido(&linea.precio_unitario, "precio_unitario")
                .and_then(|s| monto_valido(s, "precio_unitario"))
                .and_then(|p| {
                    if p >= Decimal::ZERO {
                        Ok(p)
                    } else {
                        Err("el precio unitario no puede ser negativo".to_string())
                    }
                })
                .map_err(|e| format!("Detalle {}: {}", n, e)),
        );

        let iva = match presente(&linea.porcentaje_iva) {
            Some(valor) => v.revisar(
                decimal(valor, "porcentaje_iva")
                    .and_then(|p| porcentaje_iva(p, "porcentaje_iva"))
                    .map_err(|e| format!("Detalle {}: {}", n, e)),
            ),
            None => Some(Decimal::ZERO),
        };

        match (servicio, cantidad, precio, iva) {
            (Some(servicio_productos_id), Some(cantidad), Some(precio_unitario), Some(iva)) => {
                let linea = DetalleValidado {
                    servicio_productos_id,
                    cantidad,
                    precio_unitario,
                    porcentaje_iva: iva,
                };
                if linea.subtotal().is_ok_and(monto::cabe_en_columna) {
                    detalle.push(linea);
                } else {
                    v.error(format!(
                        "Detalle {}: el subtotal de la línea excede el máximo permitido",
                        n
                    ));
                    completo = false;
                }
            }
            _ => completo = false,
        }
    }

    Ok(completo.then_some(detalle))
}

fn leer_lineas(valor: Option<&Value>) -> Result<Vec<Value>, String> {
    let items = match valor {
        None | Some(Value::Null) => return Err(mensajes::DETALLE_VACIO.to_string()),
        Some(Value::Array(items)) => items.clone(),
        Some(Value::String(texto)) if texto.trim().is_empty() => {
            return Err(mensajes::DETALLE_VACIO.to_string());
        }
        Some(Value::String(texto)) => match serde_json::from_str::<Value>(texto) {
            Ok(Value::Array(items)) => items,
            _ => return Err(mensajes::DETALLE_INVALIDO.to_string()),
        },
        Some(_) => return Err(mensajes::DETALLE_INVALIDO.to_string()),
    };

    if items.is_empty() {
        return Err(mensajes::DETALLE_VACIO.to_string());
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;
    use crate::db::gateway::fake::FakeGateway;
    use crate::models::AuthContext;

    fn ctx() -> RequestContext {
        RequestContext::new(
            AuthContext {
                usuario_id: 10,
                rol_id: 1,
            },
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        )
    }

    fn gateway() -> FakeGateway {
        let mut gw = FakeGateway::default();
        gw.sucursales.insert(1);
        gw.usuarios.insert(10);
        gw.proveedores.insert(3);
        gw.tipos_gasto.extend([TIPO_GASTO_OPERATIVO_ID, 2]);
        gw.clientes.insert(1);
        gw.servicios.insert(5);
        gw
    }

    fn documento(nombre: &str, tamano: usize) -> ArchivoAdjunto {
        ArchivoAdjunto::new(nombre, Some("application/pdf".to_string()), vec![0; tamano])
    }

    fn gasto_input(extra: Value) -> RegistroInput {
        let mut base = json!({
            "tipo": "gasto",
            "fecha": "2024-05-20",
            "sucursal_id": 1,
            "tipo_gasto_id": 2,
            "concepto_pago": "Mantenimiento de montacargas",
            "subtotal": "250.00",
            "porcentaje_iva": 16,
            "moneda": "USD"
        });
        if let (Some(base), Some(extra)) = (base.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(base).unwrap()
    }

    fn cotizacion_input() -> RegistroInput {
        serde_json::from_value(json!({
            "tipo": "cotizacion",
            "cliente_id": 1,
            "fecha": "2024-01-01",
            "total": 150.00,
            "detalle": [{
                "servicio_productos_id": 5,
                "cantidad": 2,
                "precio_unitario": 50,
                "porcentaje_iva": 16
            }]
        }))
        .unwrap()
    }

    fn errores(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation { errores, .. } => errores,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[actix_rt::test]
    async fn test_unknown_tipo_rejected_before_any_query() {
        let gw = gateway();
        for tipo in [None, Some("factura"), Some("")] {
            let input = RegistroInput {
                tipo: tipo.map(str::to_string),
                ..Default::default()
            };
            let err = validar_registro(&gw, &ctx(), &input, None)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{:?}", err);
        }
        assert_eq!(gw.consultas(), 0);
    }

    #[actix_rt::test]
    async fn test_valid_gasto_is_normalized() {
        let gw = gateway();
        let validado = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({})),
            Some(documento("factura-001.pdf", 1024)),
        )
        .await
        .unwrap();

        let RegistroValidado::Gasto(gasto) = validado else {
            panic!("expected gasto");
        };
        assert_eq!(gasto.tipo_gasto_id, 2);
        assert_eq!(gasto.proveedor_id, None);
        assert_eq!(gasto.subtotal, Decimal::from(250));
        assert_eq!(gasto.moneda, Moneda::Usd);
        assert_eq!(gasto.tasa_cambio, None);
        assert_eq!(gasto.usuario_id, 10);
        assert_eq!(gasto.total().unwrap(), Decimal::from(290));
    }

    #[actix_rt::test]
    async fn test_ves_requires_tasa_cambio() {
        let gw = gateway();
        let err = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "moneda": "VES" })),
            Some(documento("f.pdf", 10)),
        )
        .await
        .unwrap_err();
        assert!(errores(err).contains(&mensajes::TASA_CAMBIO_OBLIGATORIA.to_string()));

        let ok = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "moneda": "VES", "tasa_cambio": "36.50" })),
            Some(documento("f.pdf", 10)),
        )
        .await
        .unwrap();
        let RegistroValidado::Gasto(gasto) = ok else {
            panic!("expected gasto");
        };
        assert_eq!(gasto.tasa_cambio, Some(Decimal::from_str("36.50").unwrap()));
    }

    #[actix_rt::test]
    async fn test_gasto_amounts_must_fit_the_column() {
        let gw = gateway();
        for (subtotal, esperado) in [
            ("0.001", "admite como máximo 2 decimales"),
            ("79228162514264337593543950335", "excede el máximo permitido"),
            ("1000000000000", "excede el máximo permitido"),
        ] {
            let err = validar_registro(
                &gw,
                &ctx(),
                &gasto_input(json!({ "subtotal": subtotal })),
                Some(documento("f.pdf", 10)),
            )
            .await
            .unwrap_err();
            let errores = errores(err);
            assert!(errores.iter().any(|e| e.contains(esperado)), "{subtotal}: {errores:?}");
        }

        let err = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "subtotal": "999999999999.99" })),
            Some(documento("f.pdf", 10)),
        )
        .await
        .unwrap_err();
        assert!(errores(err).contains(&mensajes::TOTAL_EXCEDIDO.to_string()));

        let err = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "moneda": "VES", "tasa_cambio": "36.12345" })),
            Some(documento("f.pdf", 10)),
        )
        .await
        .unwrap_err();
        assert!(errores(err).iter().any(|e| e.contains("4 decimales")));
    }

    #[actix_rt::test]
    async fn test_cotizacion_line_amounts_are_bounded() {
        let gw = gateway();
        let con_detalle = |cantidad: Value, precio: &str| -> RegistroInput {
            serde_json::from_value(json!({
                "tipo": "cotizacion",
                "cliente_id": 1,
                "fecha": "2024-01-01",
                "total": "150.00",
                "detalle": [{
                    "servicio_productos_id": 5,
                    "cantidad": cantidad,
                    "precio_unitario": precio,
                    "porcentaje_iva": 16
                }]
            }))
            .unwrap()
        };

        for (cantidad, precio, esperado) in [
            (json!(2), "79228162514264337593543950335", "Detalle 1: El campo precio_unitario excede"),
            (json!(2), "999999999999.99", "Detalle 1: el subtotal de la línea excede"),
            (json!(2), "10.005", "Detalle 1: El campo precio_unitario admite"),
            (json!(2_000_000), "1", "Detalle 1: la cantidad no puede superar"),
        ] {
            let err = validar_registro(&gw, &ctx(), &con_detalle(cantidad, precio), None)
                .await
                .unwrap_err();
            let errores = errores(err);
            assert!(errores.iter().any(|e| e.starts_with(esperado)), "{precio}: {errores:?}");
        }

        let err = validar_registro(
            &gw,
            &ctx(),
            &serde_json::from_value(json!({
                "tipo": "cotizacion",
                "cliente_id": 1,
                "fecha": "2024-01-01",
                "total": "0.001",
                "detalle": [{ "servicio_productos_id": 5, "cantidad": 1, "precio_unitario": "1" }]
            }))
            .unwrap(),
            None,
        )
        .await
        .unwrap_err();
        assert!(errores(err).iter().any(|e| e.contains("2 decimales")));
    }

    #[actix_rt::test]
    async fn test_operativo_requires_proveedor() {
        let gw = gateway();
        let err = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "tipo_gasto_id": TIPO_GASTO_OPERATIVO_ID })),
            Some(documento("f.pdf", 10)),
        )
        .await
        .unwrap_err();
        assert_eq!(errores(err), vec![mensajes::PROVEEDOR_OBLIGATORIO]);

        let ok = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "tipo_gasto_id": TIPO_GASTO_OPERATIVO_ID, "proveedor_id": 3 })),
            Some(documento("f.pdf", 10)),
        )
        .await;
        assert!(ok.is_ok());
    }

    #[actix_rt::test]
    async fn test_gasto_accumulates_all_failures() {
        let gw = gateway();
        let input: RegistroInput = serde_json::from_value(json!({
            "tipo": "gasto",
            "fecha": "2030-01-01",
            "sucursal_id": 99,
            "tipo_gasto_id": 2,
            "subtotal": "-5",
            "porcentaje_iva": "12",
            "moneda": "EUR",
            "proveedor_id": 42
        }))
        .unwrap();

        let errs = errores(
            validar_registro(&gw, &ctx(), &input, Some(documento("virus.exe", 3 * 1024 * 1024)))
                .await
                .unwrap_err(),
        );

        for esperado in [
            mensajes::FECHA_FUTURA,
            mensajes::SUCURSAL_NO_EXISTE,
            "El campo concepto_pago es obligatorio",
            mensajes::SUBTOTAL_POSITIVO,
            "El campo porcentaje_iva debe ser 0, 8 o 16",
            mensajes::MONEDA_INVALIDA,
            mensajes::PROVEEDOR_NO_EXISTE,
            mensajes::DOCUMENTO_EXTENSION,
            mensajes::DOCUMENTO_TAMANO,
        ] {
            assert!(errs.contains(&esperado.to_string()), "missing {esperado}: {errs:?}");
        }
    }

    #[actix_rt::test]
    async fn test_gasto_without_document() {
        let gw = gateway();
        let errs = errores(
            validar_registro(&gw, &ctx(), &gasto_input(json!({})), None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::DOCUMENTO_OBLIGATORIO]);
    }

    #[actix_rt::test]
    async fn test_document_at_exact_ceiling_is_accepted() {
        let gw = gateway();
        let ok = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({})),
            Some(documento("limite.webp", TAMANO_MAXIMO_DOCUMENTO as usize)),
        )
        .await;
        assert!(ok.is_ok());
    }

    #[actix_rt::test]
    async fn test_duplicate_file_name_rejected() {
        let mut gw = gateway();
        gw.nombres_archivo.insert("factura-001.pdf".to_string());

        let errs = errores(
            validar_registro(
                &gw,
                &ctx(),
                &gasto_input(json!({})),
                Some(documento("factura-001.pdf", 10)),
            )
            .await
            .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::archivo_duplicado("factura-001.pdf")]);
    }

    #[actix_rt::test]
    async fn test_duplicate_gasto_tuple_rejected() {
        let mut gw = gateway();
        gw.gastos.push(ClaveGasto {
            proveedor_id: None,
            concepto_pago: "Mantenimiento de montacargas".to_string(),
            subtotal: Decimal::from(250),
            fecha: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
            sucursal_id: 1,
        });

        let errs = errores(
            validar_registro(
                &gw,
                &ctx(),
                &gasto_input(json!({})),
                Some(documento("otro.pdf", 10)),
            )
            .await
            .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::GASTO_DUPLICADO]);

        // A different provider is a different tuple
        let ok = validar_registro(
            &gw,
            &ctx(),
            &gasto_input(json!({ "proveedor_id": 3 })),
            Some(documento("otro.pdf", 10)),
        )
        .await;
        assert!(ok.is_ok());
    }

    #[actix_rt::test]
    async fn test_unknown_creator_rejected() {
        let gw = gateway();
        let errs = errores(
            validar_registro(
                &gw,
                &ctx(),
                &gasto_input(json!({ "usuario_id": 77 })),
                Some(documento("f.pdf", 10)),
            )
            .await
            .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::USUARIO_NO_EXISTE]);
    }

    #[actix_rt::test]
    async fn test_valid_cotizacion() {
        let gw = gateway();
        let validado = validar_registro(&gw, &ctx(), &cotizacion_input(), None)
            .await
            .unwrap();

        let RegistroValidado::Cotizacion(cotizacion) = validado else {
            panic!("expected cotizacion");
        };
        assert_eq!(cotizacion.cliente_id, 1);
        assert_eq!(cotizacion.total, Decimal::from(150));
        assert_eq!(cotizacion.sucursal_id, None);
        assert_eq!(
            cotizacion.detalle,
            vec![DetalleValidado {
                servicio_productos_id: 5,
                cantidad: 2,
                precio_unitario: Decimal::from(50),
                porcentaje_iva: Decimal::from(16),
            }]
        );
    }

    #[actix_rt::test]
    async fn test_duplicate_cotizacion_rejected() {
        let mut gw = gateway();
        gw.cotizaciones.push((
            1,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            Decimal::from_str("150.00").unwrap(),
        ));

        let errs = errores(
            validar_registro(&gw, &ctx(), &cotizacion_input(), None)
                .await
                .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::COTIZACION_DUPLICADA]);
    }

    #[actix_rt::test]
    async fn test_cotizacion_requires_existing_client_and_positive_total() {
        let gw = gateway();
        let mut input = cotizacion_input();
        input.cliente_id = Some("8".to_string());
        input.total = Some("0".to_string());

        let errs = errores(validar_registro(&gw, &ctx(), &input, None).await.unwrap_err());
        assert!(errs.contains(&mensajes::CLIENTE_NO_EXISTE.to_string()));
        assert!(errs.contains(&mensajes::TOTAL_POSITIVO.to_string()));
    }

    #[actix_rt::test]
    async fn test_detalle_line_failures_are_numbered() {
        let gw = gateway();
        let mut input = cotizacion_input();
        input.detalle = Some(json!([
            { "servicio_productos_id": 5, "cantidad": 1, "precio_unitario": 10, "porcentaje_iva": 8 },
            { "servicio_productos_id": 6, "cantidad": 0, "precio_unitario": -1, "porcentaje_iva": 10 }
        ]));

        let errs = errores(validar_registro(&gw, &ctx(), &input, None).await.unwrap_err());
        assert_eq!(
            errs,
            vec![
                "Detalle 2: el servicio o producto 6 no existe".to_string(),
                "Detalle 2: la cantidad debe ser un entero mayor a cero".to_string(),
                "Detalle 2: el precio unitario no puede ser negativo".to_string(),
                "Detalle 2: El campo porcentaje_iva debe ser 0, 8 o 16".to_string(),
            ]
        );
    }

    #[actix_rt::test]
    async fn test_detalle_as_json_text() {
        let gw = gateway();
        let mut input = cotizacion_input();
        input.detalle = Some(Value::String(
            r#"[{"servicio_productos_id":"5","cantidad":"3","precio_unitario":"10.5"}]"#
                .to_string(),
        ));

        let validado = validar_registro(&gw, &ctx(), &input, None).await.unwrap();
        let RegistroValidado::Cotizacion(cotizacion) = validado else {
            panic!("expected cotizacion");
        };
        assert_eq!(cotizacion.detalle[0].cantidad, 3);
        assert_eq!(cotizacion.detalle[0].porcentaje_iva, Decimal::ZERO);
    }

    #[actix_rt::test]
    async fn test_empty_detalle_rejected() {
        let gw = gateway();
        let mut input = cotizacion_input();
        input.detalle = Some(json!([]));

        let errs = errores(validar_registro(&gw, &ctx(), &input, None).await.unwrap_err());
        assert_eq!(errs, vec![mensajes::DETALLE_VACIO]);
    }

    #[actix_rt::test]
    async fn test_vista_previa_defaults_fecha_to_today() {
        let gw = gateway();
        let req: VistaPreviaRequest = serde_json::from_value(json!({
            "cliente_id": "1",
            "detalle": [{ "servicio_productos_id": 5, "cantidad": 1, "precio_unitario": 20 }]
        }))
        .unwrap();

        let vista = validar_vista_previa(&gw, &ctx(), &req).await.unwrap();
        assert_eq!(vista.fecha, ctx().hoy);
        assert_eq!(vista.detalle.len(), 1);
    }

    #[actix_rt::test]
    async fn test_vista_previa_requires_client_and_lines() {
        let gw = gateway();
        let errs = errores(
            validar_vista_previa(&gw, &ctx(), &VistaPreviaRequest::default())
                .await
                .unwrap_err(),
        );
        assert_eq!(errs, vec![mensajes::CLIENTE_OBLIGATORIO, mensajes::DETALLE_VACIO]);
    }

    #[actix_rt::test]
    async fn test_gateway_failure_is_a_server_error() {
        let mut gw = gateway();
        gw.falla = true;

        let err = validar_registro(&gw, &ctx(), &cotizacion_input(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
