//! Database operations for roles and their permission keys.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entity::{rol, rol_permiso};
use crate::error::{AppError, AppResult};

use super::{DbPool, es_violacion_unica};

impl DbPool {
    pub async fn rol_tiene_permiso(&self, rol_id: i32, clave: &str) -> AppResult<bool> {
        let count = rol_permiso::Entity::find()
            .filter(rol_permiso::Column::RolId.eq(rol_id))
            .filter(rol_permiso::Column::Clave.eq(clave))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check permiso: {}", e)))?;
        Ok(count > 0)
    }

    /// List roles with their permission keys, ordered by id.
    pub async fn list_roles(&self) -> AppResult<Vec<(rol::Model, Vec<rol_permiso::Model>)>> {
        let result = rol::Entity::find()
            .order_by_asc(rol::Column::Id)
            .find_with_related(rol_permiso::Entity)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list roles: {}", e)))?;
        Ok(result)
    }

    /// Insert a role and its permission keys in one transaction.
    pub async fn insert_rol(
        &self,
        nombre: &str,
        descripcion: Option<&str>,
        permisos: &[String],
    ) -> AppResult<(rol::Model, Vec<rol_permiso::Model>)> {
        let txn = self.connection().begin().await?;

        let rol = rol::ActiveModel {
            nombre: Set(nombre.to_string()),
            descripcion: Set(descripcion.map(str::to_string)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if es_violacion_unica(&e) {
                AppError::validation(vec![format!("Ya existe un rol con el nombre '{}'", nombre)])
            } else {
                AppError::Database(format!("Failed to insert rol: {}", e))
            }
        })?;

        let mut insertados = Vec::with_capacity(permisos.len());
        for clave in permisos {
            let permiso = rol_permiso::ActiveModel {
                rol_id: Set(rol.id),
                clave: Set(clave.clone()),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert permiso: {}", e)))?;
            insertados.push(permiso);
        }

        txn.commit().await?;

        Ok((rol, insertados))
    }
}
