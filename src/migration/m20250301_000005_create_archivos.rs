//! Migration: Create repository folders, uploaded files and the file audit trail.
//!
//! `eventos_archivo` is append-only: a trigger rejects UPDATE and DELETE.

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
                CREATE TABLE carpetas (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(150) NOT NULL,
                    prefijo_s3 VARCHAR(255) NOT NULL UNIQUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE archivos (
                    id SERIAL PRIMARY KEY,
                    registro_tipo VARCHAR(20)
                        CHECK (registro_tipo IS NULL OR registro_tipo IN ('gasto', 'cotizacion')),
                    registro_id INTEGER,
                    carpeta_id INTEGER REFERENCES carpetas(id),
                    nombre_original VARCHAR(255) NOT NULL,
                    extension VARCHAR(10) NOT NULL,
                    ruta_s3 VARCHAR(500) NOT NULL UNIQUE,
                    tamano_bytes BIGINT NOT NULL CHECK (tamano_bytes >= 0),
                    subido_por INTEGER NOT NULL REFERENCES usuarios(id),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_archivos_nombre_original ON archivos(nombre_original);
                CREATE INDEX idx_archivos_subido_por ON archivos(subido_por);
                CREATE INDEX idx_archivos_registro ON archivos(registro_tipo, registro_id);

                CREATE TABLE eventos_archivo (
                    id SERIAL PRIMARY KEY,
                    archivo_id INTEGER NOT NULL REFERENCES archivos(id),
                    accion VARCHAR(50) NOT NULL,
                    usuario_id INTEGER NOT NULL REFERENCES usuarios(id),
                    ip VARCHAR(64),
                    user_agent VARCHAR(500),
                    detalles JSONB,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_eventos_archivo_archivo ON eventos_archivo(archivo_id);

                CREATE OR REPLACE FUNCTION eventos_archivo_inmutable()
                RETURNS TRIGGER AS $$
                BEGIN
                    RAISE EXCEPTION 'eventos_archivo es de solo inserción';
                END;
                $$ LANGUAGE plpgsql;

                CREATE TRIGGER eventos_archivo_solo_insercion
                    BEFORE UPDATE OR DELETE ON eventos_archivo
                    FOR EACH ROW
                    EXECUTE FUNCTION eventos_archivo_inmutable();
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
                DROP TRIGGER IF EXISTS eventos_archivo_solo_insercion ON eventos_archivo;
                DROP FUNCTION IF EXISTS eventos_archivo_inmutable();
                DROP TABLE IF EXISTS eventos_archivo CASCADE;
                DROP TABLE IF EXISTS archivos CASCADE;
                DROP TABLE IF EXISTS carpetas CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
