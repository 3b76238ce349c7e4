//! HTML documents rendered to PDF: the solicitud de pago of a gasto and the
//! preview of a cotizacion.
//!
//! Amounts are always formatted `es-VE` style (`.` thousands, `,` decimals)
//! with the currency symbol in front.

use std::fmt::Write;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::entity::{cliente, gasto, proveedor};
use crate::error::AppResult;
use crate::models::{Moneda, monto};
use crate::models::registro::codigo_gasto;

const ESTILOS: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; font-size: 12px; color: #222; margin: 24px; }
h1 { font-size: 18px; margin: 0; }
.encabezado { display: flex; justify-content: space-between; border-bottom: 2px solid #1f3b73; padding-bottom: 8px; margin-bottom: 16px; }
.estado { text-transform: uppercase; font-weight: bold; }
.columnas { display: flex; gap: 24px; }
.columnas > div { flex: 1; }
.bloque { border: 1px solid #ccc; border-radius: 4px; padding: 8px 12px; margin-bottom: 12px; }
.bloque h2 { font-size: 13px; margin: 0 0 6px 0; color: #1f3b73; }
table { width: 100%; border-collapse: collapse; margin-bottom: 12px; }
th, td { border: 1px solid #ccc; padding: 4px 8px; text-align: left; }
td.monto, th.monto { text-align: right; }
.ok { color: #1b7a1b; font-weight: bold; }
.pendiente { color: #b3261e; font-weight: bold; }
.firmas { display: flex; gap: 24px; margin-top: 48px; }
.firmas > div { flex: 1; border-top: 1px solid #222; text-align: center; padding-top: 4px; }
"#;

/// Format an amount as `Bs 1.234,50` or `$ 1.234,50`.
pub fn formatear_monto(valor: Decimal, moneda: Moneda) -> String {
    format!("{} {}", moneda.simbolo(), formatear_numero(valor))
}

/// `es-VE` number with two decimals.
pub fn formatear_numero(valor: Decimal) -> String {
    let redondeado = monto::redondear(valor);
    let texto = format!("{:.2}", redondeado.abs());
    let (entero, decimales) = texto.split_once('.').unwrap_or((&texto, "00"));

    let mut agrupado = String::with_capacity(entero.len() + entero.len() / 3);
    for (i, c) in entero.chars().enumerate() {
        if i > 0 && (entero.len() - i) % 3 == 0 {
            agrupado.push('.');
        }
        agrupado.push(c);
    }

    let signo = if redondeado.is_sign_negative() && !redondeado.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{},{}", signo, agrupado, decimales)
}

/// Escape text for HTML element and attribute content.
pub fn escapar(texto: &str) -> String {
    let mut salida = String::with_capacity(texto.len());
    for c in texto.chars() {
        match c {
            '&' => salida.push_str("&amp;"),
            '<' => salida.push_str("&lt;"),
            '>' => salida.push_str("&gt;"),
            '"' => salida.push_str("&quot;"),
            '\'' => salida.push_str("&#39;"),
            _ => salida.push(c),
        }
    }
    salida
}

fn fecha_corta(fecha: NaiveDate) -> String {
    fecha.format("%d/%m/%Y").to_string()
}

fn documento(titulo: &str, cuerpo: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"es\"><head><meta charset=\"utf-8\"><title>{}</title><style>{}</style></head><body>{}</body></html>",
        escapar(titulo),
        ESTILOS,
        cuerpo
    )
}

/// Everything the solicitud de pago shows about a gasto.
#[derive(Debug, Clone)]
pub struct SolicitudPago {
    pub gasto: gasto::Model,
    pub proveedor: Option<proveedor::Model>,
    pub sucursal: String,
    pub tipo_gasto: String,
    pub solicitante: String,
}

/// Solicitud de pago layout for a gasto.
pub fn solicitud_pago_html(solicitud: &SolicitudPago) -> String {
    let gasto = &solicitud.gasto;
    let moneda = Moneda::parse(&gasto.moneda).unwrap_or(Moneda::Usd);
    let codigo = codigo_gasto(gasto.id);
    let mut html = String::new();

    let _ = write!(
        html,
        "<div class=\"encabezado\"><h1>Solicitud de pago {}</h1><span class=\"estado\">{}</span></div>",
        escapar(&codigo),
        escapar(&gasto.estado)
    );

    let _ = write!(
        html,
        "<div class=\"columnas\"><div class=\"bloque\"><h2>Datos del gasto</h2>\
         <p><strong>Fecha:</strong> {}</p><p><strong>Sucursal:</strong> {}</p>\
         <p><strong>Tipo de gasto:</strong> {}</p></div>\
         <div class=\"bloque\"><h2>Solicitud</h2>\
         <p><strong>Concepto:</strong> {}</p><p><strong>Solicitado por:</strong> {}</p>\
         <p><strong>Moneda:</strong> {}</p></div></div>",
        fecha_corta(gasto.fecha),
        escapar(&solicitud.sucursal),
        escapar(&solicitud.tipo_gasto),
        escapar(&gasto.concepto_pago),
        escapar(&solicitud.solicitante),
        moneda.as_str()
    );

    if let Some(proveedor) = &solicitud.proveedor {
        let _ = write!(
            html,
            "<div class=\"bloque\"><h2>Proveedor</h2><p><strong>Nombre:</strong> {}</p><p><strong>RIF:</strong> {}</p>",
            escapar(&proveedor.nombre),
            escapar(&proveedor.rif)
        );
        if let Some(telefono) = &proveedor.telefono {
            let _ = write!(html, "<p><strong>Teléfono:</strong> {}</p>", escapar(telefono));
        }
        if let Some(email) = &proveedor.email {
            let _ = write!(html, "<p><strong>Email:</strong> {}</p>", escapar(email));
        }
        html.push_str("</div>");

        if let (Some(banco), Some(cuenta)) = (&proveedor.banco, &proveedor.numero_cuenta) {
            let _ = write!(
                html,
                "<div class=\"bloque transferencia\"><h2>Datos para transferencia</h2>\
                 <p><strong>Banco:</strong> {}</p><p><strong>Número de cuenta:</strong> {}</p>\
                 <p><strong>Titular:</strong> {}</p></div>",
                escapar(banco),
                escapar(cuenta),
                escapar(&proveedor.nombre)
            );
        }
    }

    if let Some(observacion) = &gasto.observacion {
        let _ = write!(
            html,
            "<div class=\"bloque\"><h2>Observaciones</h2><p>{}</p></div>",
            escapar(observacion)
        );
    }

    let diferencia = gasto.total - gasto.monto_pagado;
    let clase = if diferencia.is_zero() { "ok" } else { "pendiente" };
    let tasa = gasto
        .tasa_cambio
        .map(formatear_numero)
        .unwrap_or_else(|| "N/A".to_string());

    let _ = write!(
        html,
        "<table><thead><tr><th>Moneda</th><th class=\"monto\">Tasa de cambio</th>\
         <th class=\"monto\">Subtotal</th><th class=\"monto\">IVA ({}%)</th>\
         <th class=\"monto\">Monto solicitado</th><th class=\"monto\">Monto pagado</th>\
         <th class=\"monto\">Diferencia</th></tr></thead><tbody><tr>\
         <td>{}</td><td class=\"monto\">{}</td><td class=\"monto\">{}</td><td class=\"monto\">{}</td>\
         <td class=\"monto\">{}</td><td class=\"monto\">{}</td><td class=\"monto {}\">{}</td>\
         </tr></tbody></table>",
        gasto.porcentaje_iva.normalize(),
        moneda.as_str(),
        tasa,
        formatear_monto(gasto.subtotal, moneda),
        formatear_monto(gasto.monto_iva, moneda),
        formatear_monto(gasto.total, moneda),
        formatear_monto(gasto.monto_pagado, moneda),
        clase,
        formatear_monto(diferencia, moneda)
    );

    html.push_str(
        "<div class=\"firmas\"><div>Solicitado por</div><div>Aprobado por</div><div>Recibido por</div></div>",
    );

    documento(&format!("Solicitud de pago {}", codigo), &html)
}

/// One priced line of a cotizacion preview.
#[derive(Debug, Clone, PartialEq)]
pub struct LineaVista {
    pub descripcion: String,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
}

impl LineaVista {
    pub fn subtotal(&self) -> AppResult<Decimal> {
        monto::importe(self.cantidad, self.precio_unitario)
    }

    pub fn monto_iva(&self) -> AppResult<Decimal> {
        monto::iva(self.subtotal()?, self.porcentaje_iva)
    }
}

/// Data of a cotizacion preview.
#[derive(Debug, Clone)]
pub struct VistaCotizacion {
    pub cliente: cliente::Model,
    pub fecha: NaiveDate,
    pub lineas: Vec<LineaVista>,
    pub observacion: Option<String>,
}

impl VistaCotizacion {
    pub fn subtotal(&self) -> AppResult<Decimal> {
        monto::sumar_todos(self.lineas.iter().map(LineaVista::subtotal))
    }

    pub fn monto_iva(&self) -> AppResult<Decimal> {
        monto::sumar_todos(self.lineas.iter().map(LineaVista::monto_iva))
    }

    pub fn total(&self) -> AppResult<Decimal> {
        monto::sumar(self.subtotal()?, self.monto_iva()?)
    }
}

/// Cotizacion preview layout. Quotations are priced in USD.
pub fn cotizacion_html(vista: &VistaCotizacion) -> AppResult<String> {
    let moneda = Moneda::Usd;
    let cliente = &vista.cliente;
    let mut html = String::new();

    let _ = write!(
        html,
        "<div class=\"encabezado\"><h1>Cotización</h1><span>{}</span></div>",
        fecha_corta(vista.fecha)
    );

    let _ = write!(
        html,
        "<div class=\"bloque\"><h2>Cliente</h2><p><strong>Nombre:</strong> {}</p>",
        escapar(&cliente.nombre)
    );
    for (etiqueta, valor) in [
        ("RIF", &cliente.rif),
        ("Email", &cliente.email),
        ("Teléfono", &cliente.telefono),
        ("Dirección", &cliente.direccion),
    ] {
        if let Some(valor) = valor {
            let _ = write!(html, "<p><strong>{}:</strong> {}</p>", etiqueta, escapar(valor));
        }
    }
    html.push_str("</div>");

    html.push_str(
        "<table><thead><tr><th>#</th><th>Descripción</th><th class=\"monto\">Cantidad</th>\
         <th class=\"monto\">Precio unitario</th><th class=\"monto\">IVA</th>\
         <th class=\"monto\">Subtotal</th></tr></thead><tbody>",
    );
    for (i, linea) in vista.lineas.iter().enumerate() {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td class=\"monto\">{}</td><td class=\"monto\">{}</td>\
             <td class=\"monto\">{}%</td><td class=\"monto\">{}</td></tr>",
            i + 1,
            escapar(&linea.descripcion),
            linea.cantidad,
            formatear_monto(linea.precio_unitario, moneda),
            linea.porcentaje_iva.normalize(),
            formatear_monto(linea.subtotal()?, moneda)
        );
    }
    html.push_str("</tbody></table>");

    let _ = write!(
        html,
        "<table class=\"totales\"><tr><th class=\"monto\">Subtotal</th><td class=\"monto\">{}</td></tr>\
         <tr><th class=\"monto\">IVA</th><td class=\"monto\">{}</td></tr>\
         <tr><th class=\"monto\">Total</th><td class=\"monto\"><strong>{}</strong></td></tr></table>",
        formatear_monto(vista.subtotal()?, moneda),
        formatear_monto(vista.monto_iva()?, moneda),
        formatear_monto(vista.total()?, moneda)
    );

    if let Some(observacion) = &vista.observacion {
        let _ = write!(
            html,
            "<div class=\"bloque\"><h2>Observaciones</h2><p>{}</p></div>",
            escapar(observacion)
        );
    }

    Ok(documento("Cotización", &html))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn gasto(moneda: &str, total: &str, pagado: &str) -> gasto::Model {
        gasto::Model {
            id: 12,
            proveedor_id: Some(3),
            tipo_gasto_id: 1,
            concepto_pago: "Cauchos <nuevos>".to_string(),
            subtotal: dec("1000.00"),
            porcentaje_iva: dec("16.00"),
            monto_iva: dec("160.00"),
            total: dec(total),
            fecha: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            sucursal_id: 1,
            moneda: moneda.to_string(),
            tasa_cambio: None,
            estado: "pendiente".to_string(),
            monto_pagado: dec(pagado),
            observacion: None,
            usuario_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn proveedor(banco: Option<&str>) -> proveedor::Model {
        proveedor::Model {
            id: 3,
            nombre: "Repuestos Andinos C.A.".to_string(),
            email: None,
            telefono: Some("0212-5551234".to_string()),
            direccion: None,
            rif: "J-123456789".to_string(),
            banco: banco.map(str::to_string),
            numero_cuenta: banco.map(|_| "0102-0000-00-0000000000".to_string()),
            estado: "activo".to_string(),
            created_at: Utc::now(),
        }
    }

    fn solicitud(gasto: gasto::Model, proveedor: Option<proveedor::Model>) -> SolicitudPago {
        SolicitudPago {
            gasto,
            proveedor,
            sucursal: "Valencia".to_string(),
            tipo_gasto: "Operativo".to_string(),
            solicitante: "Ana Pérez".to_string(),
        }
    }

    #[test]
    fn test_formatear_monto_es_ve() {
        assert_eq!(formatear_monto(dec("1234567.5"), Moneda::Usd), "$ 1.234.567,50");
        assert_eq!(formatear_monto(dec("999.999"), Moneda::Ves), "Bs 1.000,00");
        assert_eq!(formatear_monto(dec("0"), Moneda::Ves), "Bs 0,00");
        assert_eq!(formatear_monto(dec("-45.1"), Moneda::Usd), "$ -45,10");
        assert_eq!(formatear_numero(dec("100")), "100,00");
    }

    #[test]
    fn test_formatear_numero_rounds_half_cent_up() {
        assert_eq!(formatear_numero(dec("2.345")), "2,35");
        assert_eq!(formatear_numero(dec("2.335")), "2,34");
        assert_eq!(formatear_numero(dec("-2.345")), "-2,35");
        assert_eq!(formatear_numero(dec("1234.005")), "1.234,01");
    }

    #[test]
    fn test_escapar() {
        assert_eq!(
            escapar(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_solicitud_marks_settled_difference_green() {
        let html = solicitud_pago_html(&solicitud(gasto("USD", "1160.00", "1160.00"), None));
        assert!(html.contains("Solicitud de pago G-000012"));
        assert!(html.contains("class=\"monto ok\">$ 0,00"));
        assert!(html.contains("Cauchos &lt;nuevos&gt;"));
        assert!(!html.contains("Proveedor</h2>"));
    }

    #[test]
    fn test_solicitud_marks_open_difference_red() {
        let html = solicitud_pago_html(&solicitud(gasto("VES", "1160.00", "160.00"), None));
        assert!(html.contains("class=\"monto pendiente\">Bs 1.000,00"));
        assert!(html.contains("Bs 1.160,00"));
    }

    #[test]
    fn test_bank_block_only_with_account() {
        let sin_banco =
            solicitud_pago_html(&solicitud(gasto("USD", "1", "0"), Some(proveedor(None))));
        assert!(sin_banco.contains("Repuestos Andinos C.A."));
        assert!(!sin_banco.contains("Datos para transferencia"));

        let con_banco = solicitud_pago_html(&solicitud(
            gasto("USD", "1", "0"),
            Some(proveedor(Some("Banco de Venezuela"))),
        ));
        assert!(con_banco.contains("Datos para transferencia"));
        assert!(con_banco.contains("Banco de Venezuela"));
    }

    #[test]
    fn test_cotizacion_totals() {
        let vista = VistaCotizacion {
            cliente: cliente::Model {
                id: 1,
                nombre: "Distribuidora Lara".to_string(),
                rif: Some("J-987654321".to_string()),
                email: None,
                telefono: None,
                direccion: None,
                created_at: Utc::now(),
            },
            fecha: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lineas: vec![
                LineaVista {
                    descripcion: "Flete".to_string(),
                    cantidad: 2,
                    precio_unitario: dec("50"),
                    porcentaje_iva: dec("16"),
                },
                LineaVista {
                    descripcion: "Seguro".to_string(),
                    cantidad: 1,
                    precio_unitario: dec("10.50"),
                    porcentaje_iva: Decimal::ZERO,
                },
            ],
            observacion: Some("Válida por 15 días".to_string()),
        };

        assert_eq!(vista.subtotal().unwrap(), dec("110.50"));
        assert_eq!(vista.monto_iva().unwrap(), dec("16.00"));
        assert_eq!(vista.total().unwrap(), dec("126.50"));

        let html = cotizacion_html(&vista).unwrap();
        assert!(html.contains("Distribuidora Lara"));
        assert!(html.contains("J-987654321"));
        assert!(html.contains("<strong>$ 126,50</strong>"));
        assert!(html.contains("Válida por 15 días"));
    }

    #[test]
    fn test_cotizacion_overflow_is_an_error() {
        let vista = VistaCotizacion {
            cliente: cliente::Model {
                id: 1,
                nombre: "Distribuidora Lara".to_string(),
                rif: None,
                email: None,
                telefono: None,
                direccion: None,
                created_at: Utc::now(),
            },
            fecha: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lineas: vec![LineaVista {
                descripcion: "Flete".to_string(),
                cantidad: 2,
                precio_unitario: Decimal::MAX,
                porcentaje_iva: dec("16"),
            }],
            observacion: None,
        };

        assert!(vista.total().is_err());
        assert!(cotizacion_html(&vista).is_err());
    }
}
