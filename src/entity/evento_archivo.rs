//! Append-only audit trail of actions taken on an uploaded file.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "eventos_archivo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub archivo_id: i32,
    pub accion: String,
    pub usuario_id: i32,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub detalles: Option<Json>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::archivo::Entity",
        from = "Column::ArchivoId",
        to = "super::archivo::Column::Id"
    )]
    Archivo,
}

impl Related<super::archivo::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Archivo.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
