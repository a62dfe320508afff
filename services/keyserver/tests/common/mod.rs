#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use keyserver::app::AppState;
use keyserver::model::ZoneDefinition;
use keyserver::store::ZoneStore;
use keyserver::store::memory::InMemoryZoneStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use zonekeys::{AccessPolicy, KeyProjection, TokenPolicy, ZoneKeyRegistry};

pub const RSA_KEY_A: &str = include_str!("../fixtures/rsa512_a.pem");
pub const RSA_KEY_B: &str = include_str!("../fixtures/rsa512_b.pem");
pub const RSA_KEY_C: &str = include_str!("../fixtures/rsa512_c.pem");
pub const RSA_KEY_2048: &str = include_str!("../fixtures/rsa2048.pem");
pub const PROVISIONING_TOKEN: &str = "prov-token";
pub const DEFAULT_SECRET: &str = "tokenKey";

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_bytes(response: axum::response::Response) -> axum::body::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
}

pub fn keys(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(kid, material)| (kid.to_string(), material.to_string()))
        .collect()
}

pub async fn put_zone(
    store: &InMemoryZoneStore,
    zone_id: &str,
    entries: &[(&str, &str)],
    active: Option<&str>,
) {
    let definition = ZoneDefinition {
        zone_id: zone_id.to_string(),
        name: zone_id.to_string(),
        token_policy: TokenPolicy::new(keys(entries), active.map(str::to_string)),
    };
    if store.zone_exists(zone_id).await.expect("exists") {
        store.update_zone(definition).await.expect("update zone");
    } else {
        store.create_zone(definition).await.expect("create zone");
    }
}

/// Store holding an empty default zone `uaa`.
pub async fn store_with_default_zone() -> InMemoryZoneStore {
    let store = InMemoryZoneStore::new();
    put_zone(&store, "uaa", &[], None).await;
    store
}

pub fn state_with(store: InMemoryZoneStore) -> AppState {
    AppState {
        api_version: "v1".to_string(),
        default_zone_id: "uaa".to_string(),
        store: Arc::new(store),
        projection: Arc::new(KeyProjection::new(
            ZoneKeyRegistry::new(zonekeys::DEFAULT_KEY_ID, DEFAULT_SECRET),
            AccessPolicy::default(),
        )),
        provisioning_enabled: true,
        provisioning_token: Some(PROVISIONING_TOKEN.to_string()),
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn get_with(uri: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).expect("request")
}

fn now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_secs()
}

/// HS256 bearer token signed with `secret` under `kid`.
pub fn hs256_token(kid: &str, secret: &str, authorities: &[&str]) -> String {
    let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
    header.kid = Some(kid.to_string());
    let claims = serde_json::json!({
        "sub": "sample client",
        "exp": now() + 300,
        "authorities": authorities,
    });
    jsonwebtoken::encode(
        &header,
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode")
}

/// RS256 bearer token signed with the PEM private key under `kid`.
pub fn rs256_token(kid: &str, pem: &str, scope: &[&str]) -> String {
    let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let claims = serde_json::json!({
        "sub": "sample client",
        "exp": now() + 300,
        "scope": scope,
    });
    jsonwebtoken::encode(
        &header,
        &claims,
        &jsonwebtoken::EncodingKey::from_rsa_pem(pem.as_bytes()).expect("rsa key"),
    )
    .expect("encode")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
