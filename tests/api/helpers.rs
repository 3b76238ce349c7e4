//! Shared helpers for the API test suite.

use std::sync::OnceLock;

use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{App, Error, test, web};
use chrono::Utc;
use gastos_lib::api;
use gastos_lib::auth::TokenVerifier;
use gastos_lib::config::Config;
use gastos_lib::db::DbPool;
use gastos_lib::entity::{cliente, rol, rol_permiso, servicio_producto, sucursal, usuario};
use gastos_lib::models::SessionClaims;
use gastos_lib::services::{PdfRenderer, Storage};
use jsonwebtoken::{EncodingKey, Header, encode};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use secrecy::SecretString;
use uuid::Uuid;

pub const TEST_SECRET: &str = "api-test-secret";

static MIGRATIONS_RUN: OnceLock<()> = OnceLock::new();

/// Signed session token for the given user and role.
pub fn token(usuario_id: i32, rol_id: i32) -> String {
    let claims = SessionClaims {
        sub: usuario_id.to_string(),
        rol_id,
        exp: (Utc::now().timestamp() + 3600) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(usuario_id: i32, rol_id: i32) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token(usuario_id, rol_id)))
}

pub fn verifier() -> web::Data<TokenVerifier> {
    web::Data::new(TokenVerifier::new(SecretString::from(TEST_SECRET.to_string())))
}

/// App with routes and token verification only; no database behind it.
pub async fn create_app_without_db()
-> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(verifier())
            .service(web::scope("/api/v1").configure(api::configure_routes)),
    )
    .await
}

/// Fresh pool against the development database. Migrations run once.
pub async fn create_test_pool() -> (DbPool, Config) {
    let mut config = Config::from_env().expect(
        "Failed to load config. Set RUST_ENV=development and DATABASE_URL, \
         and make sure PostgreSQL is running.",
    );
    config.db_max_connections = 2;

    let pool = DbPool::new(&config)
        .await
        .expect("Failed to connect to database");

    if MIGRATIONS_RUN.get().is_none() {
        pool.run_migrations().await.expect("Failed to run migrations");
        let _ = MIGRATIONS_RUN.set(());
    }

    (pool, config)
}

/// Full app wired like `main`, minus CORS and static files.
pub async fn create_test_app(
    pool: &DbPool,
    config: &Config,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(Storage::new(&config.storage)))
            .app_data(web::Data::new(PdfRenderer::new("cat").unwrap()))
            .app_data(verifier())
            .app_data(web::Data::new(config.upload.clone()))
            .service(web::scope("/api/v1").configure(api::configure_routes)),
    )
    .await
}

fn unico(prefijo: &str) -> String {
    format!(
        "{}-{}",
        prefijo,
        Uuid::new_v4().to_string().split('-').next().unwrap()
    )
}

pub async fn crear_rol(pool: &DbPool, permisos: &[&str]) -> i32 {
    let rol = rol::ActiveModel {
        nombre: Set(unico("rol")),
        descripcion: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap();

    for clave in permisos {
        rol_permiso::ActiveModel {
            rol_id: Set(rol.id),
            clave: Set(clave.to_string()),
            ..Default::default()
        }
        .insert(pool.connection())
        .await
        .unwrap();
    }

    rol.id
}

pub async fn crear_usuario(pool: &DbPool, rol_id: i32, password: &str) -> i32 {
    let nombre = unico("usuario");
    usuario::ActiveModel {
        email: Set(format!("{}@example.com", nombre)),
        nombre: Set(nombre),
        password_hash: Set(bcrypt::hash(password, 4).unwrap()),
        rol_id: Set(rol_id),
        cuota_bytes: Set(None),
        activo: Set(true),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap()
    .id
}

pub async fn crear_cliente(pool: &DbPool) -> i32 {
    cliente::ActiveModel {
        nombre: Set(unico("cliente")),
        rif: Set(None),
        email: Set(None),
        telefono: Set(None),
        direccion: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap()
    .id
}

pub async fn crear_sucursal(pool: &DbPool) -> i32 {
    sucursal::ActiveModel {
        nombre: Set(unico("sucursal")),
        direccion: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap()
    .id
}

pub async fn crear_servicio(pool: &DbPool, precio: Decimal) -> i32 {
    servicio_producto::ActiveModel {
        nombre: Set(unico("servicio")),
        descripcion: Set(None),
        precio_unitario: Set(precio),
        porcentaje_iva: Set(Decimal::from(16)),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap()
    .id
}
