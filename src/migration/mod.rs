//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_seguridad;
mod m20250301_000002_create_catalogos;
mod m20250301_000003_create_gastos;
mod m20250301_000004_create_cotizaciones;
mod m20250301_000005_create_archivos;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_seguridad::Migration),
            Box::new(m20250301_000002_create_catalogos::Migration),
            Box::new(m20250301_000003_create_gastos::Migration),
            Box::new(m20250301_000004_create_cotizaciones::Migration),
            Box::new(m20250301_000005_create_archivos::Migration),
        ]
    }
}
