//! Role and permission models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::{rol, rol_permiso};

/// Role id that holds every permission without explicit grants.
pub const ROL_ADMINISTRADOR_ID: i32 = 1;

/// Permission keys checked by the API.
pub mod permisos {
    pub const REGISTROS_CREAR: &str = "registros.crear";
    pub const REGISTROS_VER: &str = "registros.ver";
    pub const PROVEEDORES_VER: &str = "proveedores.ver";
    pub const PROVEEDORES_CREAR: &str = "proveedores.crear";
    pub const ROLES_VER: &str = "roles.ver";
    pub const ROLES_CREAR: &str = "roles.crear";
    pub const CLIENTES_ELIMINAR: &str = "clientes.eliminar";
    pub const USUARIOS_EDITAR: &str = "usuarios.editar";
    pub const SERVICIOS_CREAR: &str = "servicios.crear";
    pub const ARCHIVOS_SUBIR: &str = "archivos.subir";
    pub const ARCHIVOS_VER: &str = "archivos.ver";

    /// Every key known to the server.
    pub const TODOS: &[&str] = &[
        REGISTROS_CREAR,
        REGISTROS_VER,
        PROVEEDORES_VER,
        PROVEEDORES_CREAR,
        ROLES_VER,
        ROLES_CREAR,
        CLIENTES_ELIMINAR,
        USUARIOS_EDITAR,
        SERVICIOS_CREAR,
        ARCHIVOS_SUBIR,
        ARCHIVOS_VER,
    ];
}

/// Request to create a role with its permission keys.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CrearRolRequest {
    pub nombre: String,
    pub descripcion: Option<String>,
    #[serde(default)]
    pub permisos: Vec<String>,
}

/// Role with its granted permission keys.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RolResponse {
    pub id: i32,
    pub nombre: String,
    pub descripcion: Option<String>,
    pub permisos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl RolResponse {
    pub fn from_model(rol: rol::Model, permisos: Vec<rol_permiso::Model>) -> Self {
        Self {
            id: rol.id,
            nombre: rol.nombre,
            descripcion: rol.descripcion,
            permisos: permisos.into_iter().map(|p| p.clave).collect(),
            created_at: rol.created_at,
        }
    }
}

/// Role list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RolListResponse {
    pub roles: Vec<RolResponse>,
}
