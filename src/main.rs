//! Gastos server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::path::PathBuf;

use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{App, HttpRequest, HttpServer, Result as ActixResult, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use gastos_lib::api::{self, ApiDoc};
use gastos_lib::auth::TokenVerifier;
use gastos_lib::config::Config;
use gastos_lib::db::DbPool;
use gastos_lib::middleware::RequestLogger;
use gastos_lib::services::{PdfRenderer, Storage};

/// SPA fallback handler - serves index.html for client-side routing.
async fn spa_fallback(req: HttpRequest) -> ActixResult<NamedFile> {
    let static_dir = req
        .app_data::<web::Data<PathBuf>>()
        .ok_or_else(|| actix_web::error::ErrorNotFound("Static dir not configured"))?;
    Ok(NamedFile::open(static_dir.join("index.html"))?)
}

fn fatal(mensaje: &str, e: impl std::fmt::Display) -> ! {
    error!("{}: {}", mensaje, e);
    std::process::exit(1);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();

    // Docker HEALTHCHECK: only verify that the configuration loads
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(if Config::from_env().is_ok() { 0 } else { 1 });
    }

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL, GASTOS_JWT_SECRET and S3 credentials must be set");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Gastos Server v{}", env!("CARGO_PKG_VERSION"));
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => fatal("Failed to initialize database", e),
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        fatal("Failed to run migrations", e);
    }
    info!("Database migrations complete");

    let storage = Storage::new(&config.storage);
    if let Err(e) = storage.ensure_bucket_exists().await {
        // Uploads fail until the bucket exists; reads of the API still work
        warn!("S3 bucket check failed: {}", e);
    }

    let renderer = match PdfRenderer::new(&config.pdf_command) {
        Ok(renderer) => renderer,
        Err(e) => fatal("Invalid GASTOS_PDF_COMMAND", e),
    };

    let verifier = TokenVerifier::new(config.jwt_secret.clone());
    let bind_address = config.bind_address();
    let upload = config.upload.clone();
    let static_dir = config.static_dir.clone();
    let is_development = config.is_development();

    info!(
        "Upload limits: {}MB per request, {}MB default quota",
        upload.max_upload_size / 1024 / 1024,
        upload.default_quota_bytes / 1024 / 1024
    );
    if let Some(dir) = &static_dir {
        info!("Static file serving enabled from {:?}", dir);
    }

    let worker_count = if is_development { 4 } else { num_cpus::get() };
    info!(
        "Starting server at http://{} ({} workers)",
        bind_address, worker_count
    );

    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                header::AUTHORIZATION,
                header::ACCEPT,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-file-size"),
            ])
            .max_age(3600);
        let cors = if is_development {
            cors.allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
        } else {
            cors
        };

        let mut app = App::new()
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(renderer.clone()))
            .app_data(web::Data::new(verifier.clone()))
            .app_data(web::Data::new(upload.clone()))
            .app_data(web::JsonConfig::default().limit(upload.max_upload_size))
            .app_data(web::PayloadConfig::new(upload.max_upload_size))
            .service(
                SwaggerUi::new("/api/docs/{_:.*}").url("/api/docs/openapi.json", openapi.clone()),
            )
            .service(web::scope("/api/v1").configure(api::configure_routes));

        if let Some(ref dir) = static_dir {
            app = app
                .app_data(web::Data::new(dir.clone()))
                .service(Files::new("/assets", dir.join("assets")).prefer_utf8(true))
                .default_service(web::route().to(spa_fallback));
        }

        app
    });

    server.workers(worker_count).bind(&bind_address)?.run().await
}
