//! Integration tests for system endpoints and the OpenAPI document.
mod common;

use axum::http::StatusCode;
use common::*;
use keyserver::app::build_router;
use tower::ServiceExt;

#[tokio::test]
async fn health_and_info_report_memory_backend() {
    let app = build_router(state_with(store_with_default_zone().await)).into_service();

    let health = app
        .clone()
        .oneshot(get("/v1/system/health"))
        .await
        .expect("health");
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(read_json(health).await["status"], "ok");

    let info = app
        .oneshot(get("/v1/system/info"))
        .await
        .expect("info");
    assert_eq!(info.status(), StatusCode::OK);
    let payload = read_json(info).await;
    assert_eq!(payload["service"], "keyserver");
    assert_eq!(payload["default_zone_id"], "uaa");
    assert_eq!(payload["storage_backend"], "memory");
    assert_eq!(payload["durable_storage"], false);
}

#[tokio::test]
async fn openapi_document_lists_key_routes() {
    let app = build_router(state_with(store_with_default_zone().await)).into_service();

    let response = app
        .oneshot(get("/v1/openapi.json"))
        .await
        .expect("openapi");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let paths = payload["paths"].as_object().expect("paths");
    for path in [
        "/token_key",
        "/token_keys",
        "/v1/zones/{zone_id}/token_key",
        "/v1/zones/{zone_id}/token_keys",
        "/internal/zones",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    let jwk = &payload["components"]["schemas"]["Jwk"]["properties"];
    for field in ["kid", "alg", "kty", "use", "value", "n", "e"] {
        assert!(jwk.get(field).is_some(), "missing Jwk.{field}");
    }
}
