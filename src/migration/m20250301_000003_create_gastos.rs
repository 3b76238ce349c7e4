//! Migration: Create gastos table.
//!
//! The unique index mirrors the duplicate-expense tuple so concurrent
//! submissions that both pass validation cannot both insert.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                CREATE TABLE gastos (
                    id SERIAL PRIMARY KEY,
                    proveedor_id INTEGER REFERENCES proveedores(id),
                    tipo_gasto_id INTEGER NOT NULL REFERENCES tipos_gasto(id),
                    concepto_pago VARCHAR(500) NOT NULL,
                    subtotal NUMERIC(14, 2) NOT NULL CHECK (subtotal > 0),
                    porcentaje_iva NUMERIC(5, 2) NOT NULL DEFAULT 0,
                    monto_iva NUMERIC(14, 2) NOT NULL DEFAULT 0,
                    total NUMERIC(14, 2) NOT NULL,
                    fecha DATE NOT NULL,
                    sucursal_id INTEGER NOT NULL REFERENCES sucursales(id),
                    moneda VARCHAR(3) NOT NULL CHECK (moneda IN ('USD', 'VES')),
                    tasa_cambio NUMERIC(14, 4),
                    estado VARCHAR(20) NOT NULL DEFAULT 'pendiente'
                        CHECK (estado IN ('pendiente', 'solicitado', 'aprobado', 'pagado')),
                    monto_pagado NUMERIC(14, 2) NOT NULL DEFAULT 0,
                    observacion TEXT,
                    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CHECK (moneda = 'USD' OR tasa_cambio IS NOT NULL)
                );

                CREATE UNIQUE INDEX uq_gastos_duplicado
                    ON gastos(COALESCE(proveedor_id, 0), concepto_pago, subtotal, fecha, sucursal_id);

                CREATE INDEX idx_gastos_estado ON gastos(estado);
                CREATE INDEX idx_gastos_sucursal ON gastos(sucursal_id);

                CREATE TRIGGER update_gastos_updated_at
                    BEFORE UPDATE ON gastos
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(
                r#"
                DROP TRIGGER IF EXISTS update_gastos_updated_at ON gastos;
                DROP TABLE IF EXISTS gastos CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
