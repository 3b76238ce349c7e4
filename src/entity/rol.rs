//! Role entity. A user's role decides which permission keys they hold.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rol_permiso::Entity")]
    Permisos,
}

impl Related<super::rol_permiso::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permisos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
