//! Read-side persistence gateway consulted by the validators.
//!
//! Each method is one round trip. Nothing is cached between calls, so a
//! validation pass sees the database as it is at the moment of each check.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::DbPool;
use crate::error::AppResult;

/// Tuple that identifies a duplicate gasto.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaveGasto {
    pub proveedor_id: Option<i32>,
    pub concepto_pago: String,
    pub subtotal: Decimal,
    pub fecha: NaiveDate,
    pub sucursal_id: i32,
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn sucursal_existe(&self, id: i32) -> AppResult<bool>;
    async fn usuario_existe(&self, id: i32) -> AppResult<bool>;
    async fn proveedor_existe(&self, id: i32) -> AppResult<bool>;
    async fn tipo_gasto_existe(&self, id: i32) -> AppResult<bool>;
    async fn cliente_existe(&self, id: i32) -> AppResult<bool>;
    async fn servicio_producto_existe(&self, id: i32) -> AppResult<bool>;

    /// Exact match against `archivos.nombre_original`.
    async fn nombre_archivo_existe(&self, nombre: &str) -> AppResult<bool>;
    async fn gasto_duplicado(&self, clave: &ClaveGasto) -> AppResult<bool>;
    async fn cotizacion_duplicada(
        &self,
        cliente_id: i32,
        fecha: NaiveDate,
        total: Decimal,
    ) -> AppResult<bool>;

    /// Sum of `tamano_bytes` over every file uploaded by the user.
    async fn uso_almacenamiento(&self, usuario_id: i32) -> AppResult<i64>;
    /// The user's own quota, `None` when unset or when the user is unknown.
    async fn cuota_usuario(&self, usuario_id: i32) -> AppResult<Option<i64>>;

    async fn cliente_tiene_cuentas_pendientes(&self, cliente_id: i32) -> AppResult<bool>;
    async fn cliente_tiene_cotizaciones_en_proceso(&self, cliente_id: i32) -> AppResult<bool>;

    /// `None` when the user does not exist.
    async fn password_hash(&self, usuario_id: i32) -> AppResult<Option<String>>;

    async fn proveedor_duplicado(
        &self,
        nombre: &str,
        email: Option<&str>,
        telefono: Option<&str>,
    ) -> AppResult<bool>;

    async fn rol_tiene_permiso(&self, rol_id: i32, clave: &str) -> AppResult<bool>;
}

#[async_trait]
impl Gateway for DbPool {
    async fn sucursal_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::sucursal_existe(self, id).await
    }

    async fn usuario_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::usuario_existe(self, id).await
    }

    async fn proveedor_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::proveedor_existe(self, id).await
    }

    async fn tipo_gasto_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::tipo_gasto_existe(self, id).await
    }

    async fn cliente_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::cliente_existe(self, id).await
    }

    async fn servicio_producto_existe(&self, id: i32) -> AppResult<bool> {
        DbPool::servicio_producto_existe(self, id).await
    }

    async fn nombre_archivo_existe(&self, nombre: &str) -> AppResult<bool> {
        DbPool::nombre_archivo_existe(self, nombre).await
    }

    async fn gasto_duplicado(&self, clave: &ClaveGasto) -> AppResult<bool> {
        DbPool::gasto_duplicado(self, clave).await
    }

    async fn cotizacion_duplicada(
        &self,
        cliente_id: i32,
        fecha: NaiveDate,
        total: Decimal,
    ) -> AppResult<bool> {
        DbPool::cotizacion_duplicada(self, cliente_id, fecha, total).await
    }

    async fn uso_almacenamiento(&self, usuario_id: i32) -> AppResult<i64> {
        DbPool::uso_almacenamiento(self, usuario_id).await
    }

    async fn cuota_usuario(&self, usuario_id: i32) -> AppResult<Option<i64>> {
        DbPool::cuota_usuario(self, usuario_id).await
    }

    async fn cliente_tiene_cuentas_pendientes(&self, cliente_id: i32) -> AppResult<bool> {
        DbPool::cliente_tiene_cuentas_pendientes(self, cliente_id).await
    }

    async fn cliente_tiene_cotizaciones_en_proceso(&self, cliente_id: i32) -> AppResult<bool> {
        DbPool::cliente_tiene_cotizaciones_en_proceso(self, cliente_id).await
    }

    async fn password_hash(&self, usuario_id: i32) -> AppResult<Option<String>> {
        DbPool::password_hash(self, usuario_id).await
    }

    async fn proveedor_duplicado(
        &self,
        nombre: &str,
        email: Option<&str>,
        telefono: Option<&str>,
    ) -> AppResult<bool> {
        DbPool::proveedor_duplicado(self, nombre, email, telefono).await
    }

    async fn rol_tiene_permiso(&self, rol_id: i32, clave: &str) -> AppResult<bool> {
        DbPool::rol_tiene_permiso(self, rol_id, clave).await
    }
}

/// In-memory gateway for validator tests.
#[cfg(test)]
pub mod fake {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::AppError;

    #[derive(Default)]
    pub struct FakeGateway {
        pub sucursales: HashSet<i32>,
        pub usuarios: HashSet<i32>,
        pub proveedores: HashSet<i32>,
        pub tipos_gasto: HashSet<i32>,
        pub clientes: HashSet<i32>,
        pub servicios: HashSet<i32>,
        pub nombres_archivo: HashSet<String>,
        pub gastos: Vec<ClaveGasto>,
        pub cotizaciones: Vec<(i32, NaiveDate, Decimal)>,
        pub uso: HashMap<i32, i64>,
        pub cuotas: HashMap<i32, i64>,
        pub cuentas_pendientes: HashSet<i32>,
        pub cotizaciones_en_proceso: HashSet<i32>,
        pub password_hashes: HashMap<i32, String>,
        pub proveedores_registrados: Vec<(String, Option<String>, Option<String>)>,
        pub permisos: HashSet<(i32, String)>,
        /// Every call fails with a database error when set
        pub falla: bool,
        consultas: AtomicUsize,
    }

    impl FakeGateway {
        /// Number of gateway calls made so far.
        pub fn consultas(&self) -> usize {
            self.consultas.load(Ordering::SeqCst)
        }

        fn consultar(&self) -> AppResult<()> {
            self.consultas.fetch_add(1, Ordering::SeqCst);
            if self.falla {
                return Err(AppError::Database("connection refused".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Gateway for FakeGateway {
        async fn sucursal_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.sucursales.contains(&id))
        }

        async fn usuario_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.usuarios.contains(&id))
        }

        async fn proveedor_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.proveedores.contains(&id))
        }

        async fn tipo_gasto_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.tipos_gasto.contains(&id))
        }

        async fn cliente_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.clientes.contains(&id))
        }

        async fn servicio_producto_existe(&self, id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.servicios.contains(&id))
        }

        async fn nombre_archivo_existe(&self, nombre: &str) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.nombres_archivo.contains(nombre))
        }

        async fn gasto_duplicado(&self, clave: &ClaveGasto) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.gastos.contains(clave))
        }

        async fn cotizacion_duplicada(
            &self,
            cliente_id: i32,
            fecha: NaiveDate,
            total: Decimal,
        ) -> AppResult<bool> {
            self.consultar()?;
            Ok(self
                .cotizaciones
                .iter()
                .any(|(c, f, t)| *c == cliente_id && *f == fecha && *t == total))
        }

        async fn uso_almacenamiento(&self, usuario_id: i32) -> AppResult<i64> {
            self.consultar()?;
            Ok(self.uso.get(&usuario_id).copied().unwrap_or(0))
        }

        async fn cuota_usuario(&self, usuario_id: i32) -> AppResult<Option<i64>> {
            self.consultar()?;
            Ok(self.cuotas.get(&usuario_id).copied())
        }

        async fn cliente_tiene_cuentas_pendientes(&self, cliente_id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.cuentas_pendientes.contains(&cliente_id))
        }

        async fn cliente_tiene_cotizaciones_en_proceso(&self, cliente_id: i32) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.cotizaciones_en_proceso.contains(&cliente_id))
        }

        async fn password_hash(&self, usuario_id: i32) -> AppResult<Option<String>> {
            self.consultar()?;
            Ok(self.password_hashes.get(&usuario_id).cloned())
        }

        async fn proveedor_duplicado(
            &self,
            nombre: &str,
            email: Option<&str>,
            telefono: Option<&str>,
        ) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.proveedores_registrados.iter().any(|(n, e, t)| {
                n == nombre && e.as_deref() == email && t.as_deref() == telefono
            }))
        }

        async fn rol_tiene_permiso(&self, rol_id: i32, clave: &str) -> AppResult<bool> {
            self.consultar()?;
            Ok(self.permisos.contains(&(rol_id, clave.to_string())))
        }
    }
}
