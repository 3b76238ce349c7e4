use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "cotizacion_detalles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub cotizacion_id: i32,
    pub servicio_productos_id: i32,
    pub cantidad: i32,
    pub precio_unitario: Decimal,
    pub porcentaje_iva: Decimal,
    pub subtotal: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cotizacion::Entity",
        from = "Column::CotizacionId",
        to = "super::cotizacion::Column::Id",
        on_delete = "Cascade"
    )]
    Cotizacion,
}

impl Related<super::cotizacion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cotizacion.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
