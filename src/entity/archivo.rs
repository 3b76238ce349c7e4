//! Uploaded artifact. Rows are written once and never updated.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "archivos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub registro_tipo: Option<String>,
    pub registro_id: Option<i32>,
    pub carpeta_id: Option<i32>,
    pub nombre_original: String,
    pub extension: String,
    pub ruta_s3: String,
    pub tamano_bytes: i64,
    pub subido_por: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::evento_archivo::Entity")]
    Eventos,
}

impl Related<super::evento_archivo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Eventos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
