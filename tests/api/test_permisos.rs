//! Permission checks against the `rol_permisos` table.

use actix_web::test;
use gastos_lib::models::permisos;
use serde_json::{Value, json};

use super::helpers::*;

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_role_without_permission_gets_403() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let rol = crear_rol(&pool, &[permisos::PROVEEDORES_VER]).await;
    let usuario = crear_usuario(&pool, rol, "clave-segura").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(usuario, rol))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "FORBIDDEN");

    let req = test::TestRequest::get()
        .uri("/api/v1/proveedores")
        .insert_header(bearer(usuario, rol))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_created_role_grants_its_permissions() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let admin = crear_usuario(&pool, 1, "clave-segura").await;

    let nombre = format!("Compras {}", uuid::Uuid::new_v4());
    let req = test::TestRequest::post()
        .uri("/api/v1/roles")
        .insert_header(bearer(admin, 1))
        .set_json(json!({
            "nombre": nombre,
            "permisos": [permisos::ROLES_VER, permisos::ROLES_VER]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["permisos"], json!([permisos::ROLES_VER]));
    let rol = body["id"].as_i64().unwrap() as i32;

    let usuario = crear_usuario(&pool, rol, "clave-segura").await;
    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(bearer(usuario, rol))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_password_change_rejects_current_password() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let rol = crear_rol(&pool, &[]).await;
    let usuario = crear_usuario(&pool, rol, "clave-actual").await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/usuarios/{}/password", usuario))
        .insert_header(bearer(usuario, rol))
        .set_json(json!({ "password": "clave-actual" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/usuarios/{}/password", usuario))
        .insert_header(bearer(usuario, rol))
        .set_json(json!({ "password": "clave-nueva-2024" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // Someone else's password needs usuarios.editar
    let otro = crear_usuario(&pool, rol, "clave-otro").await;
    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/usuarios/{}/password", otro))
        .insert_header(bearer(usuario, rol))
        .set_json(json!({ "password": "clave-nueva-2024" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}
