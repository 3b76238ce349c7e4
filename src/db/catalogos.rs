//! Database queries for referential catalogues: branches, expense types and
//! billable services/products.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};

use crate::entity::{servicio_producto, sucursal, tipo_gasto};
use crate::error::{AppError, AppResult};
use crate::models::NuevoServicioProducto;

use super::DbPool;

impl DbPool {
    pub async fn sucursal_existe(&self, id: i32) -> AppResult<bool> {
        let count = sucursal::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up sucursal: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_sucursal(&self, id: i32) -> AppResult<Option<sucursal::Model>> {
        let result = sucursal::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get sucursal: {}", e)))?;
        Ok(result)
    }

    pub async fn tipo_gasto_existe(&self, id: i32) -> AppResult<bool> {
        let count = tipo_gasto::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up tipo de gasto: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_tipo_gasto(&self, id: i32) -> AppResult<Option<tipo_gasto::Model>> {
        let result = tipo_gasto::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get tipo de gasto: {}", e)))?;
        Ok(result)
    }

    pub async fn servicio_producto_existe(&self, id: i32) -> AppResult<bool> {
        let count = servicio_producto::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to look up servicio/producto: {}", e))
            })?;
        Ok(count > 0)
    }

    /// Fetch the services/products with the given ids, keyed by id.
    pub async fn servicios_por_id(
        &self,
        ids: &[i32],
    ) -> AppResult<HashMap<i32, servicio_producto::Model>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = servicio_producto::Entity::find()
            .filter(servicio_producto::Column::Id.is_in(ids.iter().copied()))
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get servicios: {}", e)))?;

        Ok(rows.into_iter().map(|m| (m.id, m)).collect())
    }

    pub async fn insert_servicio_producto(
        &self,
        nuevo: &NuevoServicioProducto,
    ) -> AppResult<servicio_producto::Model> {
        let model = servicio_producto::ActiveModel {
            nombre: Set(nuevo.nombre.clone()),
            descripcion: Set(nuevo.descripcion.clone()),
            precio_unitario: Set(nuevo.precio_unitario),
            porcentaje_iva: Set(nuevo.porcentaje_iva),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = model.insert(self.connection()).await.map_err(|e| {
            AppError::Database(format!("Failed to insert servicio/producto: {}", e))
        })?;

        Ok(result)
    }
}
