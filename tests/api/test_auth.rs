//! Every protected route rejects requests without a valid bearer token.

use actix_web::test;
use serde_json::Value;

use super::helpers::*;

const RUTAS: &[(&str, &str)] = &[
    ("POST", "/api/v1/registros"),
    ("POST", "/api/v1/registros/cotizaciones/vista-previa"),
    ("GET", "/api/v1/registros/gastos/1/solicitud"),
    ("GET", "/api/v1/proveedores"),
    ("POST", "/api/v1/proveedores"),
    ("GET", "/api/v1/proveedores/check?nombre=x"),
    ("GET", "/api/v1/roles"),
    ("POST", "/api/v1/roles"),
    ("DELETE", "/api/v1/clientes/1"),
    ("PUT", "/api/v1/usuarios/1/password"),
    ("POST", "/api/v1/servicios-productos"),
    ("POST", "/api/v1/archivos"),
    ("POST", "/api/v1/archivos/presign"),
    ("GET", "/api/v1/archivos/1/eventos"),
];

fn request(method: &str, uri: &str) -> test::TestRequest {
    match method {
        "GET" => test::TestRequest::get(),
        "POST" => test::TestRequest::post(),
        "PUT" => test::TestRequest::put(),
        "DELETE" => test::TestRequest::delete(),
        other => panic!("unexpected method {other}"),
    }
    .uri(uri)
}

#[actix_rt::test]
async fn test_missing_token_returns_401() {
    let app = create_app_without_db().await;

    for (method, uri) in RUTAS {
        let resp = test::call_service(&app, request(method, uri).to_request()).await;
        assert_eq!(resp.status(), 401, "{method} {uri}");

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "UNAUTHORIZED", "{method} {uri}");
    }
}

#[actix_rt::test]
async fn test_token_signed_with_other_secret_returns_401() {
    let app = create_app_without_db().await;

    let ajeno = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &gastos_lib::models::SessionClaims {
            sub: "1".to_string(),
            rol_id: 1,
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"otro-secreto"),
    )
    .unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(("Authorization", format!("Bearer {}", ajeno)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_non_bearer_scheme_returns_401() {
    let app = create_app_without_db().await;

    let req = test::TestRequest::get()
        .uri("/api/v1/roles")
        .insert_header(("Authorization", format!("Token {}", token(1, 1))))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
async fn test_health_is_public() {
    let app = create_app_without_db().await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
