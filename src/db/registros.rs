//! Database operations for gastos and cotizaciones.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entity::{cotizacion, cotizacion_detalle, gasto};
use crate::error::{AppError, AppResult};
use crate::models::{EstadoCotizacion, EstadoGasto, NuevaCotizacion, NuevoGasto};
use crate::validation::registro::mensajes;

use super::{ClaveGasto, DbPool, es_violacion_unica};

/// Insert a validated gasto with its computed amounts.
///
/// A hit on the duplicate-tuple unique index is reported like the
/// pre-insert duplicate check.
pub async fn insertar_gasto<C: ConnectionTrait>(
    db: &C,
    nuevo: &NuevoGasto,
) -> AppResult<gasto::Model> {
    let now = Utc::now();
    let monto_iva = nuevo.monto_iva()?;
    let total = nuevo.total()?;

    let model = gasto::ActiveModel {
        proveedor_id: Set(nuevo.proveedor_id),
        tipo_gasto_id: Set(nuevo.tipo_gasto_id),
        concepto_pago: Set(nuevo.concepto_pago.clone()),
        subtotal: Set(nuevo.subtotal),
        porcentaje_iva: Set(nuevo.porcentaje_iva),
        monto_iva: Set(monto_iva),
        total: Set(total),
        fecha: Set(nuevo.fecha),
        sucursal_id: Set(nuevo.sucursal_id),
        moneda: Set(nuevo.moneda.as_str().to_string()),
        tasa_cambio: Set(nuevo.tasa_cambio),
        estado: Set(EstadoGasto::Pendiente.as_str().to_string()),
        monto_pagado: Set(Decimal::ZERO),
        observacion: Set(nuevo.observacion.clone()),
        usuario_id: Set(nuevo.usuario_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(|e| {
        if es_violacion_unica(&e) {
            AppError::validation(vec![mensajes::GASTO_DUPLICADO.to_string()])
        } else {
            AppError::Database(format!("Failed to insert gasto: {}", e))
        }
    })
}

impl DbPool {
    pub async fn gasto_duplicado(&self, clave: &ClaveGasto) -> AppResult<bool> {
        let mut select = gasto::Entity::find()
            .filter(gasto::Column::ConceptoPago.eq(clave.concepto_pago.as_str()))
            .filter(gasto::Column::Subtotal.eq(clave.subtotal))
            .filter(gasto::Column::Fecha.eq(clave.fecha))
            .filter(gasto::Column::SucursalId.eq(clave.sucursal_id));

        select = match clave.proveedor_id {
            Some(id) => select.filter(gasto::Column::ProveedorId.eq(id)),
            None => select.filter(gasto::Column::ProveedorId.is_null()),
        };

        let count = select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check gasto duplicado: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn cotizacion_duplicada(
        &self,
        cliente_id: i32,
        fecha: NaiveDate,
        total: Decimal,
    ) -> AppResult<bool> {
        let count = cotizacion::Entity::find()
            .filter(cotizacion::Column::ClienteId.eq(cliente_id))
            .filter(cotizacion::Column::Fecha.eq(fecha))
            .filter(cotizacion::Column::Total.eq(total))
            .count(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to check cotizacion duplicada: {}", e))
            })?;
        Ok(count > 0)
    }

    pub async fn get_gasto(&self, id: i32) -> AppResult<Option<gasto::Model>> {
        let result = gasto::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get gasto: {}", e)))?;
        Ok(result)
    }

    /// Insert a cotizacion and all its lines in one transaction.
    pub async fn insertar_cotizacion(
        &self,
        nueva: &NuevaCotizacion,
    ) -> AppResult<(cotizacion::Model, Vec<cotizacion_detalle::Model>)> {
        let now = Utc::now();
        let txn = self.connection().begin().await?;

        let cotizacion = cotizacion::ActiveModel {
            cliente_id: Set(nueva.cliente_id),
            sucursal_id: Set(nueva.sucursal_id),
            fecha: Set(nueva.fecha),
            total: Set(nueva.total),
            estado: Set(EstadoCotizacion::Pendiente.as_str().to_string()),
            observacion: Set(nueva.observacion.clone()),
            usuario_id: Set(nueva.usuario_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if es_violacion_unica(&e) {
                AppError::validation(vec![mensajes::COTIZACION_DUPLICADA.to_string()])
            } else {
                AppError::Database(format!("Failed to insert cotizacion: {}", e))
            }
        })?;

        for linea in &nueva.detalle {
            cotizacion_detalle::ActiveModel {
                cotizacion_id: Set(cotizacion.id),
                servicio_productos_id: Set(linea.servicio_productos_id),
                cantidad: Set(linea.cantidad),
                precio_unitario: Set(linea.precio_unitario),
                porcentaje_iva: Set(linea.porcentaje_iva),
                subtotal: Set(linea.subtotal()?),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert detalle: {}", e)))?;
        }

        let detalle = cotizacion_detalle::Entity::find()
            .filter(cotizacion_detalle::Column::CotizacionId.eq(cotizacion.id))
            .order_by_asc(cotizacion_detalle::Column::Id)
            .all(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to read detalle: {}", e)))?;

        txn.commit().await?;

        Ok((cotizacion, detalle))
    }
}
