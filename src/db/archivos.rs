//! Database operations for uploaded files, repository folders and the file
//! audit trail.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

use crate::entity::{archivo, carpeta, evento_archivo};
use crate::error::{AppError, AppResult};
use crate::models::TipoRegistro;

use super::DbPool;

/// File row to insert.
#[derive(Debug, Clone)]
pub struct NuevoArchivo {
    pub registro_tipo: Option<TipoRegistro>,
    pub registro_id: Option<i32>,
    pub carpeta_id: Option<i32>,
    pub nombre_original: String,
    pub extension: String,
    pub ruta_s3: String,
    pub tamano_bytes: i64,
    pub subido_por: i32,
}

/// Audit row to append.
#[derive(Debug, Clone)]
pub struct NuevoEvento {
    pub accion: &'static str,
    pub usuario_id: i32,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub detalles: Option<serde_json::Value>,
}

/// Insert a file row together with its first audit event.
///
/// Takes any connection so callers can run it inside a transaction.
pub async fn insertar_archivo<C: ConnectionTrait>(
    db: &C,
    nuevo: &NuevoArchivo,
    evento: &NuevoEvento,
) -> AppResult<archivo::Model> {
    let now = Utc::now();

    let archivo = archivo::ActiveModel {
        registro_tipo: Set(nuevo.registro_tipo.map(|t| t.as_str().to_string())),
        registro_id: Set(nuevo.registro_id),
        carpeta_id: Set(nuevo.carpeta_id),
        nombre_original: Set(nuevo.nombre_original.clone()),
        extension: Set(nuevo.extension.clone()),
        ruta_s3: Set(nuevo.ruta_s3.clone()),
        tamano_bytes: Set(nuevo.tamano_bytes),
        subido_por: Set(nuevo.subido_por),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert archivo: {}", e)))?;

    evento_archivo::ActiveModel {
        archivo_id: Set(archivo.id),
        accion: Set(evento.accion.to_string()),
        usuario_id: Set(evento.usuario_id),
        ip: Set(evento.ip.clone()),
        user_agent: Set(evento.user_agent.clone()),
        detalles: Set(evento.detalles.clone()),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| AppError::Database(format!("Failed to insert evento de archivo: {}", e)))?;

    Ok(archivo)
}

impl DbPool {
    pub async fn nombre_archivo_existe(&self, nombre: &str) -> AppResult<bool> {
        let count = archivo::Entity::find()
            .filter(archivo::Column::NombreOriginal.eq(nombre))
            .count(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to look up archivo: {}", e)))?;
        Ok(count > 0)
    }

    /// Cumulative bytes uploaded by a user.
    pub async fn uso_almacenamiento(&self, usuario_id: i32) -> AppResult<i64> {
        let total = archivo::Entity::find()
            .select_only()
            .column_as(Expr::cust("COALESCE(SUM(tamano_bytes), 0)::BIGINT"), "total")
            .filter(archivo::Column::SubidoPor.eq(usuario_id))
            .into_tuple::<i64>()
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to sum storage usage: {}", e)))?;
        Ok(total.unwrap_or(0))
    }

    pub async fn get_archivo(&self, id: i32) -> AppResult<Option<archivo::Model>> {
        let result = archivo::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get archivo: {}", e)))?;
        Ok(result)
    }

    pub async fn get_carpeta(&self, id: i32) -> AppResult<Option<carpeta::Model>> {
        let result = carpeta::Entity::find_by_id(id)
            .one(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to get carpeta: {}", e)))?;
        Ok(result)
    }

    pub async fn insertar_archivo(
        &self,
        nuevo: &NuevoArchivo,
        evento: &NuevoEvento,
    ) -> AppResult<archivo::Model> {
        let txn = self.connection().begin().await?;
        let archivo = insertar_archivo(&txn, nuevo, evento).await?;
        txn.commit().await?;
        Ok(archivo)
    }

    /// Audit trail of a file, oldest first.
    pub async fn list_eventos_archivo(
        &self,
        archivo_id: i32,
    ) -> AppResult<Vec<evento_archivo::Model>> {
        let result = evento_archivo::Entity::find()
            .filter(evento_archivo::Column::ArchivoId.eq(archivo_id))
            .order_by_asc(evento_archivo::Column::CreatedAt)
            .order_by_asc(evento_archivo::Column::Id)
            .all(self.connection())
            .await
            .map_err(|e| AppError::Database(format!("Failed to list eventos: {}", e)))?;
        Ok(result)
    }
}
