//! Migration: Create referential catalogues.
//!
//! Branches, clients, providers, expense types and billable services/products.

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
                CREATE TABLE sucursales (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(150) NOT NULL,
                    direccion VARCHAR(255),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE clientes (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(200) NOT NULL,
                    rif VARCHAR(20),
                    email VARCHAR(255),
                    telefono VARCHAR(30),
                    direccion VARCHAR(255),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE TABLE proveedores (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(200) NOT NULL,
                    email VARCHAR(255),
                    telefono VARCHAR(30),
                    direccion VARCHAR(255),
                    rif VARCHAR(20) NOT NULL,
                    banco VARCHAR(100),
                    numero_cuenta VARCHAR(30),
                    estado VARCHAR(20) NOT NULL DEFAULT 'activo'
                        CHECK (estado IN ('activo', 'inactivo')),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );

                CREATE INDEX idx_proveedores_duplicado
                    ON proveedores(nombre, email, telefono);

                CREATE TABLE tipos_gasto (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(100) NOT NULL UNIQUE,
                    descripcion VARCHAR(255)
                );

                -- Id 1 is the "Operativo" type; providers are mandatory for it
                INSERT INTO tipos_gasto (id, nombre, descripcion)
                    VALUES (1, 'Operativo', 'Gastos operativos con proveedor');
                SELECT setval('tipos_gasto_id_seq', (SELECT MAX(id) FROM tipos_gasto));

                CREATE TABLE servicios_productos (
                    id SERIAL PRIMARY KEY,
                    nombre VARCHAR(200) NOT NULL,
                    descripcion VARCHAR(500),
                    precio_unitario NUMERIC(14, 2) NOT NULL CHECK (precio_unitario >= 0),
                    porcentaje_iva NUMERIC(5, 2) NOT NULL
                        CHECK (porcentaje_iva IN (0, 8, 16)),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
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
                DROP TABLE IF EXISTS servicios_productos CASCADE;
                DROP TABLE IF EXISTS tipos_gasto CASCADE;
                DROP TABLE IF EXISTS proveedores CASCADE;
                DROP TABLE IF EXISTS clientes CASCADE;
                DROP TABLE IF EXISTS sucursales CASCADE;
                "#,
            )
            .await?;

        Ok(())
    }
}
