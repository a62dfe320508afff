//! Integration tests for the internal zone provisioning API.
//!
//! # Key invariants
//! - Every request needs the provisioning token.
//! - Listings never contain key material.
//! - The default zone cannot be deleted.
//! - Provisioned keys are immediately served by the public router.
mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::*;
use keyserver::api::zones::PROVISIONING_TOKEN_HEADER;
use keyserver::app::{build_provisioning_router, build_router};
use tower::ServiceExt;

fn provisioning_request(method: Method, uri: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(PROVISIONING_TOKEN_HEADER, PROVISIONING_TOKEN)
        .header("content-type", "application/json");
    match body {
        Some(body) => builder
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

#[tokio::test]
async fn put_creates_then_replaces_zone() {
    let store = store_with_default_zone().await;
    let state = state_with(store);
    let provisioning = build_provisioning_router(state.clone()).into_service();
    let public = build_router(state).into_service();

    let created = provisioning
        .clone()
        .oneshot(provisioning_request(
            Method::PUT,
            "/internal/zones/test-zone",
            Some(serde_json::json!({
                "name": "Test Zone",
                "keys": {"key1": RSA_KEY_A},
                "active_key_id": "key1",
            })),
        ))
        .await
        .expect("create");
    assert_eq!(created.status(), StatusCode::CREATED);
    let summary = read_json(created).await;
    assert_eq!(summary["zone_id"], "test-zone");
    assert_eq!(summary["name"], "Test Zone");
    assert_eq!(summary["key_ids"], serde_json::json!(["key1"]));
    assert!(!summary.to_string().contains("PRIVATE KEY"));

    let replaced = provisioning
        .oneshot(provisioning_request(
            Method::PUT,
            "/internal/zones/test-zone",
            Some(serde_json::json!({"keys": {"key2": RSA_KEY_B}})),
        ))
        .await
        .expect("replace");
    assert_eq!(replaced.status(), StatusCode::OK);

    let response = public
        .oneshot(get("/v1/zones/test-zone/token_key"))
        .await
        .expect("token_key");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["kid"], "key2");
}

#[tokio::test]
async fn list_returns_summaries_without_material() {
    let store = store_with_default_zone().await;
    put_zone(&store, "test-zone", &[("secretKey", "super-secret-value")], None).await;
    let app = build_provisioning_router(state_with(store)).into_service();

    let response = app
        .oneshot(provisioning_request(Method::GET, "/internal/zones", None))
        .await
        .expect("list");
    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let items = payload["items"].as_array().expect("items");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["zone_id"], "test-zone");
    assert_eq!(items[0]["key_ids"], serde_json::json!(["secretKey"]));
    assert!(!payload.to_string().contains("super-secret-value"));
}

#[tokio::test]
async fn invalid_zone_definitions_are_rejected() {
    let app = build_provisioning_router(state_with(store_with_default_zone().await)).into_service();

    for body in [
        serde_json::json!({"keys": {"key1": "secret"}, "active_key_id": "key2"}),
        serde_json::json!({"keys": {"key1": ""}}),
    ] {
        let response = app
            .clone()
            .oneshot(provisioning_request(
                Method::PUT,
                "/internal/zones/test-zone",
                Some(body),
            ))
            .await
            .expect("put");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["code"], "validation_error");
    }
}

#[tokio::test]
async fn delete_removes_zone_but_not_default() {
    let store = store_with_default_zone().await;
    put_zone(&store, "test-zone", &[("key1", RSA_KEY_A)], None).await;
    let state = state_with(store);
    let app = build_provisioning_router(state.clone()).into_service();

    let response = app
        .clone()
        .oneshot(provisioning_request(Method::DELETE, "/internal/zones/uaa", None))
        .await
        .expect("delete default");
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(read_json(response).await["code"], "default_zone");

    let response = app
        .clone()
        .oneshot(provisioning_request(
            Method::DELETE,
            "/internal/zones/test-zone",
            None,
        ))
        .await
        .expect("delete");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(provisioning_request(
            Method::DELETE,
            "/internal/zones/test-zone",
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = build_router(state)
        .into_service()
        .oneshot(get("/v1/zones/test-zone/token_keys"))
        .await
        .expect("token_keys");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn requests_require_provisioning_token() {
    let app = build_provisioning_router(state_with(store_with_default_zone().await)).into_service();

    let missing = app
        .clone()
        .oneshot(get("/internal/zones"))
        .await
        .expect("missing token");
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = app
        .oneshot(get_with(
            "/internal/zones",
            &[(PROVISIONING_TOKEN_HEADER, "wrong-token")],
        ))
        .await
        .expect("wrong token");
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn disabled_provisioning_is_not_found() {
    let mut state = state_with(store_with_default_zone().await);
    state.provisioning_enabled = false;
    let app = build_provisioning_router(state).into_service();

    let response = app
        .oneshot(provisioning_request(Method::GET, "/internal/zones", None))
        .await
        .expect("disabled");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["code"], "not_enabled");
}
