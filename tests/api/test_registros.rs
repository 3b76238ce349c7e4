//! End-to-end registro flows against PostgreSQL.

use actix_web::test;
use chrono::Local;
use gastos_lib::models::ROL_ADMINISTRADOR_ID;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::helpers::*;

fn cotizacion(cliente_id: i32, servicio_id: i32, total: &str) -> Value {
    json!({
        "tipo": "cotizacion",
        "fecha": Local::now().date_naive().to_string(),
        "cliente_id": cliente_id,
        "total": total,
        "observacion": "Flete Valencia - Caracas",
        "detalle": [
            {
                "servicio_productos_id": servicio_id,
                "cantidad": 2,
                "precio_unitario": "75.00",
                "porcentaje_iva": 16
            }
        ]
    })
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_cotizacion_created_then_rejected_as_duplicate() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let usuario = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;
    let cliente = crear_cliente(&pool).await;
    let servicio = crear_servicio(&pool, Decimal::from(75)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/registros")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(cotizacion(cliente, servicio, "174.00"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tipo"], "cotizacion");
    assert_eq!(body["cliente_id"], cliente);
    assert_eq!(body["usuario_id"], usuario);
    assert_eq!(body["estado"], "pendiente");
    assert_eq!(body["detalle"].as_array().map(Vec::len), Some(1));
    assert!(body["codigo"].as_str().is_some_and(|c| c.starts_with("C-")));

    // Same (cliente, fecha, total) again
    let req = test::TestRequest::post()
        .uri("/api/v1/registros")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(cotizacion(cliente, servicio, "174.00"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    let errores: Vec<&str> = body["errores"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert_eq!(
        errores,
        [gastos_lib::validation::registro::mensajes::COTIZACION_DUPLICADA]
    );

    // A different total is a different quotation
    let req = test::TestRequest::post()
        .uri("/api/v1/registros")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(cotizacion(cliente, servicio, "175.00"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_unknown_tipo_is_rejected_with_400() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let usuario = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/registros")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(json!({ "tipo": "factura", "fecha": "2024-01-01" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_gasto_without_document_reports_every_failure() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let usuario = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;
    let sucursal = crear_sucursal(&pool).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/registros")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(json!({
            "tipo": "gasto",
            "fecha": Local::now().date_naive().to_string(),
            "sucursal_id": sucursal,
            "tipo_gasto_id": 1,
            "concepto_pago": "Repuestos",
            "subtotal": "-5",
            "moneda": "VES"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: Value = test::read_body_json(resp).await;
    let errores = body["errores"].as_array().unwrap();
    // proveedor (Operativo), subtotal, tasa_cambio and documento
    assert!(errores.len() >= 4, "{errores:?}");
}

#[actix_rt::test]
#[ignore = "requires PostgreSQL"]
async fn test_cotizacion_preview_is_rendered() {
    let (pool, config) = create_test_pool().await;
    let app = create_test_app(&pool, &config).await;
    let usuario = crear_usuario(&pool, ROL_ADMINISTRADOR_ID, "clave-segura").await;
    let cliente = crear_cliente(&pool).await;
    let servicio = crear_servicio(&pool, Decimal::from(10)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/registros/cotizaciones/vista-previa")
        .insert_header(bearer(usuario, ROL_ADMINISTRADOR_ID))
        .set_json(json!({
            "cliente_id": cliente,
            "detalle": [{
                "servicio_productos_id": servicio,
                "cantidad": 3,
                "precio_unitario": "1000.50",
                "porcentaje_iva": 16
            }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/pdf"
    );

    // The test renderer is `cat`, so the body is the HTML itself
    let body = test::read_body(resp).await;
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("3.001,50"), "{html}");
}
