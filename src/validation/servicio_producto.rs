//! Checks for the services/products catalogue form.

use rust_decimal::Decimal;

use super::{Validacion, decimal, monto_valido, porcentaje_iva, presente, requerido};
use crate::error::AppResult;
use crate::models::{NuevoServicioProducto, ServicioProductoInput};

/// Validate a new catalogue item. IVA must be exactly 0, 8 or 16.
pub fn validar_servicio_producto(
    input: &ServicioProductoInput,
) -> AppResult<NuevoServicioProducto> {
    let mut v = Validacion::new();

    let nombre = v
        .revisar(requerido(&input.nombre, "nombre"))
        .map(str::to_string);

    let precio_unitario = v
        .revisar(
            requerido(&input.precio_unitario, "precio_unitario")
                .and_then(|s| monto_valido(s, "precio_unitario")),
        )
        .and_then(|p| {
            if p >= Decimal::ZERO {
                Some(p)
            } else {
                v.error("El precio unitario no puede ser negativo");
                None
            }
        });

    let iva = match presente(&input.porcentaje_iva) {
        Some(valor) => v.revisar(
            decimal(valor, "porcentaje_iva").and_then(|p| porcentaje_iva(p, "porcentaje_iva")),
        ),
        None => Some(Decimal::ZERO),
    };

    match (nombre, precio_unitario, iva) {
        (Some(nombre), Some(precio_unitario), Some(porcentaje_iva)) if v.es_valida() => {
            Ok(NuevoServicioProducto {
                nombre,
                descripcion: presente(&input.descripcion).map(str::to_string),
                precio_unitario,
                porcentaje_iva,
            })
        }
        _ => Err(v.into_error("servicio_producto")),
    }
}
