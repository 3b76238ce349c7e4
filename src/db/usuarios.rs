//! Database operations for users.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, QuerySelect, Set};

use crate::entity::usuario;
use crate::error::{AppError, AppResult};

use super::DbPool;

impl DbPool {
    pub async fn usuario_existe(&self, id: i32) -> AppResult<bool> {
        let count = usuario::Entity::find_by_id(id)
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up usuario: {}", e)))?;
        Ok(count > 0)
    }

    pub async fn get_usuario(&self, id: i32) -> AppResult<Option<usuario::Model>> {
        let result = usuario::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get usuario: {}", e)))?;
        Ok(result)
    }

    /// Current bcrypt hash, `None` when the user does not exist.
    pub async fn password_hash(&self, id: i32) -> AppResult<Option<String>> {
        let hash = usuario::Entity::find_by_id(id)
            .select_only()
            .column(usuario::Column::PasswordHash)
            .into_tuple::<String>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get password hash: {}", e)))?;
        Ok(hash)
    }

    pub async fn cuota_usuario(&self, id: i32) -> AppResult<Option<i64>> {
        let cuota = usuario::Entity::find_by_id(id)
            .select_only()
            .column(usuario::Column::CuotaBytes)
            .into_tuple::<Option<i64>>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get cuota: {}", e)))?;
        Ok(cuota.flatten())
    }

    /// Store a new password hash.
    pub async fn actualizar_password(&self, id: i32, password_hash: String) -> AppResult<()> {
        let usuario = self
            .get_usuario(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Usuario {}", id)))?;

        let mut active: usuario::ActiveModel = usuario.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());
        active
            .update(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to update password: {}", e)))?;

        Ok(())
    }
}
