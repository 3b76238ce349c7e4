//! Guarded client deletion.

use actix_web::test;
use chrono::Utc;
use gastos_lib::entity::cuenta_por_cobrar;
use gastos_lib::models::ROL_ADMINISTRADOR_ID;
use gastos_lib::validation::cliente::TIENE_CUENTAS_PENDIENTES;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;

use super::helpers::*;

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_client_with_pending_receivable_is_kept() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let admin = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;
    let cliente = crear_cliente(&pool).await;

    let cuenta = cuenta_por_cobrar::ActiveModel {
        cliente_id: Set(cliente),
        cotizacion_id: Set(None),
        monto: Set(Decimal::from(250)),
        estado: Set("pendiente".to_string()),
        fecha_vencimiento: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(pool.connection())
    .await
    .unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/clientes/{}", cliente))
        .insert_header(bearer(admin, ROL_ADMINISTRADOR_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], TIENE_CUENTAS_PENDIENTES);
    assert!(pool.cliente_existe(cliente).await.unwrap());

    // Settle it and the delete goes through
    let mut cuenta: cuenta_por_cobrar::ActiveModel = cuenta.into();
    cuenta.estado = Set("pagada".to_string());
    cuenta.update(pool.connection()).await.unwrap();

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/clientes/{}", cliente))
        .insert_header(bearer(admin, ROL_ADMINISTRADOR_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(!pool.cliente_existe(cliente).await.unwrap());
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_unknown_client_is_404() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let admin = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;

    let req = test::TestRequest::delete()
        .uri("/api/v1/clientes/999999999")
        .insert_header(bearer(admin, ROL_ADMINISTRADOR_ID))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
