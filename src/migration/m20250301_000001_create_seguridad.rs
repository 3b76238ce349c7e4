//! Migration: Create roles, role permissions and users.
//!
//! Also creates the shared updated_at trigger function and seeds the
//! administrator role (id 1).

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
                -- Shared trigger function for updated_at
                CREATE OR REPLACE FUNCTION update_updated_at_column()
                RETURNS TRIGGER AS $$
                BEGIN
                    NEW.updated_at = NOW();
                    RETURN NEW;
                END;
                $$ LANGUAGE plpgsql;

                CREATE TABLE roles (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(100) NOT NULL UNIQUE,
                    descripcion VARCHAR(255),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE rol_permisos (
                    id SERIAL PRIMARY KEY,
                    rol_id INTEGER NOT NULL REFERENCES roles(id) ON DELETE CASCADE,
                    clave VARCHAR(100) NOT NULL,
                    UNIQUE (rol_id, clave)
                );

                CREATE TABLE usuarios (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(150) NOT NULL,
                    email VARCHAR(255) NOT NULL UNIQUE,
                    password_hash VARCHAR(255) NOT NULL,
                    rol_id INTEGER NOT NULL REFERENCES roles(id),
                    cuota_bytes BIGINT CHECK (cuota_bytes IS NULL OR cuota_bytes > 0),
                    activo BOOLEAN NOT NULL DEFAULT TRUE,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_usuarios_rol ON usuarios(rol_id);

                CREATE TRIGGER update_usuarios_updated_at
                    BEFORE UPDATE ON usuarios
                    FOR EACH ROW
                    EXECUTE FUNCTION update_updated_at_column();

                -- Role 1 holds every permission implicitly
                INSERT INTO roles (id, nombre, descripcion)
                    VALUES (1, 'Administrador', 'Acceso total');
                SELECT setval('roles_id_seq', (SELECT MAX(id) FROM roles));
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
                DROP TRIGGER IF EXISTS update_usuarios_updated_at ON usuarios;
                DROP TABLE IF EXISTS usuarios CASCADE;
                DROP TABLE IF EXISTS rol_permisos CASCADE;
                DROP TABLE IF EXISTS roles CASCADE;
                DROP FUNCTION IF EXISTS update_updated_at_column();
                "#,
            )
            .await?;

        Ok(())
    }
}
