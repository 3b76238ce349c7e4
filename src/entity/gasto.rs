//! Expense request entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "gastos")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub proveedor_id: Option<i32>,
    pub tipo_gasto_id: i32,
    pub concepto_pago: String,
    pub subtotal: Decimal,
    pub porcentaje_iva: Decimal,
    pub monto_iva: Decimal,
    pub total: Decimal,
    pub fecha: Date,
    pub sucursal_id: i32,
    pub moneda: String,
    pub tasa_cambio: Option<Decimal>,
    pub estado: String,
    pub monto_pagado: Decimal,
    pub observacion: Option<String>,
    pub usuario_id: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::proveedor::Entity",
        from = "Column::ProveedorId",
        to = "super::proveedor::Column::Id"
    )]
    Proveedor,
    #[sea_orm(
        belongs_to = "super::sucursal::Entity",
        from = "Column::SucursalId",
        to = "super::sucursal::Column::Id"
    )]
    Sucursal,
}

impl Related<super::proveedor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proveedor.def()
    }
}

impl Related<super::sucursal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sucursal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
