//! Database operations for providers.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

use crate::entity::proveedor;
use crate::error::{AppError, AppResult};
use crate::models::NuevoProveedor;

use super::DbPool;

impl DbPool {
    pub async fn proveedor_existe(&self, id: i32) -> AppResult<bool> {
        let count = proveedor::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up proveedor: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_proveedor(&self, id: i32) -> AppResult<Option<proveedor::Model>> {
        let result = proveedor::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get proveedor: {}", e)))?;
        Ok(result)
    }

    /// List providers ordered by name.
    pub async fn list_proveedores(&self) -> AppResult<Vec<proveedor::Model>> {
        let result = proveedor::Entity::find()
            .order_by_asc(proveedor::Column::Nombre)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list proveedores: {}", e)))?;
        Ok(result)
    }

    /// Exact match on (nombre, email, telefono); an absent value matches NULL.
    pub async fn proveedor_duplicado(
        &self,
        nombre: &str,
        email: Option<&str>,
        telefono: Option<&str>,
    ) -> AppResult<bool> {
        let mut select = proveedor::Entity::find().filter(proveedor::Column::Nombre.eq(nombre));

        select = match email {
            Some(email) => select.filter(proveedor::Column::Email.eq(email)),
            None => select.filter(proveedor::Column::Email.is_null()),
        };
        select = match telefono {
            Some(telefono) => select.filter(proveedor::Column::Telefono.eq(telefono)),
            None => select.filter(proveedor::Column::Telefono.is_null()),
        };

        let count = select
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to check proveedor: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn insert_proveedor(&self, nuevo: &NuevoProveedor) -> AppResult<proveedor::Model> {
        let model = proveedor::ActiveModel {
            nombre: Set(nuevo.nombre.clone()),
            email: Set(nuevo.email.clone()),
            telefono: Set(nuevo.telefono.clone()),
            direccion: Set(nuevo.direccion.clone()),
            rif: Set(nuevo.rif.clone()),
            banco: Set(nuevo.banco.clone()),
            numero_cuenta: Set(nuevo.numero_cuenta.clone()),
            estado: Set("activo".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        let result = model
            .insert(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to insert proveedor: {}", e)))?;
        Ok(result)
    }
}
