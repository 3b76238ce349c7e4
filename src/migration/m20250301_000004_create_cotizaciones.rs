//! Migration: Create cotizaciones, their line items and client receivables.

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
                CREATE TABLE cotizaciones (
                    id SERIAL PRIMARY KEY,
                    cliente_id INTEGER NOT NULL REFERENCES clientes(id) ON DELETE CASCADE,
                    sucursal_id INTEGER REFERENCES sucursales(id),
                    fecha DATE NOT NULL,
                    total NUMERIC(14, 2) NOT NULL CHECK (total > 0),
                    estado VARCHAR(20) NOT NULL DEFAULT 'pendiente'
                        CHECK (estado IN ('pendiente', 'en_proceso', 'aprobada', 'rechazada')),
                    observacion TEXT,
                    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

                    CONSTRAINT uq_cotizaciones_duplicado UNIQUE (cliente_id, fecha, total)
                );

                CREATE INDEX idx_cotizaciones_cliente_estado ON cotizaciones(cliente_id, estado);

                CREATE TRIGGER update_cotizaciones_updated_at
                    BEFORE UPDATE ON cotizaciones
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                CREATE TABLE cotizacion_detalles (
                    id SERIAL PRIMARY KEY,
                    cotizacion_id INTEGER NOT NULL REFERENCES cotizaciones(id) ON DELETE CASCADE,
                    servicio_productos_id INTEGER NOT NULL REFERENCES servicios_productos(id),
                    cantidad INTEGER NOT NULL CHECK (cantidad > 0),
                    precio_unitario NUMERIC(14, 2) NOT NULL CHECK (precio_unitario >= 0),
                    porcentaje_iva NUMERIC(5, 2) NOT NULL CHECK (porcentaje_iva IN (0, 8, 16)),
                    subtotal NUMERIC(14, 2) NOT NULL
                );

                CREATE INDEX idx_cotizacion_detalles_cotizacion
                    ON cotizacion_detalles(cotizacion_id);

                CREATE TABLE cuentas_por_cobrar (
                    id SERIAL PRIMARY KEY,
                    cliente_id INTEGER NOT NULL REFERENCES clientes(id) ON DELETE CASCADE,
                    cotizacion_id INTEGER REFERENCES cotizaciones(id) ON DELETE SET NULL,
                    monto NUMERIC(14, 2) NOT NULL,
                    estado VARCHAR(20) NOT NULL DEFAULT 'pendiente'
                        CHECK (estado IN ('pendiente', 'pagada')),
                    fecha_vencimiento DATE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_cuentas_por_cobrar_cliente_estado
                    ON cuentas_por_cobrar(cliente_id, estado);
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
                DROP TABLE IF EXISTS cuentas_por_cobrar CASCADE;
                DROP TABLE IF EXISTS cotizacion_detalles CASCADE;
                DROP TRIGGER IF EXISTS update_cotizaciones_updated_at ON cotizaciones;
                DROP TABLE IF EXISTS cotizaciones CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
