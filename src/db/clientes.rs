//! Database operations for clients.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use crate::entity::{cliente, cotizacion, cuenta_por_cobrar};
use crate::error::{AppError, AppResult};
use crate::models::EstadoCotizacion;

use super::DbPool;

/// Receivable state that blocks a client deletion.
const CUENTA_PENDIENTE: &str = "pendiente";

impl DbPool {
    pub async fn cliente_existe(&self, id: i32) -> AppResult<bool> {
        let count = cliente::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up cliente: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_cliente(&self, id: i32) -> AppResult<Option<cliente::Model>> {
        let result = cliente::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get cliente: {}", e)))?;
        Ok(result)
    }

    pub async fn cliente_tiene_cuentas_pendientes(&self, cliente_id: i32) -> AppResult<bool> {
        let count = cuenta_por_cobrar::Entity::find()
            .filter(cuenta_por_cobrar::Column::ClienteId.eq(cliente_id))
            .filter(cuenta_por_cobrar::Column::Estado.eq(CUENTA_PENDIENTE))
            .count(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to count cuentas por cobrar: {}", e))
            })?;
        Ok(count > 0)
    }

    pub async fn cliente_tiene_cotizaciones_en_proceso(&self, cliente_id: i32) -> AppResult<bool> {
        let count = cotizacion::Entity::find()
            .filter(cotizacion::Column::ClienteId.eq(cliente_id))
            .filter(cotizacion::Column::Estado.eq(EstadoCotizacion::EnProceso.as_str()))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count cotizaciones: {}", e)))?;
        Ok(count > 0)
    }

    /// Delete a client. Returns false when no row matched.
    pub async fn eliminar_cliente(&self, id: i32) -> AppResult<bool> {
        let result = cliente::Entity::delete_by_id(id)
            .exec(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to delete cliente: {}", e)))?;
        Ok(result.rows_affected > 0)
    }
}
