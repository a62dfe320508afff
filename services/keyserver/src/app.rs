//! Key server HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum routers, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::observability;
use crate::store::ZoneStore;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use zonekeys::KeyProjection;

#[derive(Clone)]
pub struct AppState {
    pub api_version: String,
    pub default_zone_id: String,
    pub store: Arc<dyn ZoneStore + Send + Sync>,
    pub projection: Arc<KeyProjection>,
    pub provisioning_enabled: bool,
    pub provisioning_token: Option<String>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/token_key",
            axum::routing::get(api::token_keys::default_token_key),
        )
        .route(
            "/token_keys",
            axum::routing::get(api::token_keys::default_token_keys),
        )
        .route(
            "/v1/zones/:zone_id/token_key",
            axum::routing::get(api::token_keys::zone_token_key),
        )
        .route(
            "/v1/zones/:zone_id/token_keys",
            axum::routing::get(api::token_keys::zone_token_keys),
        )
        .route(
            "/v1/system/info",
            axum::routing::get(api::system::system_info),
        )
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(
            "/v1/openapi.json",
            axum::routing::get(api::openapi::openapi_json),
        )
        .layer(trace_layer)
        .with_state(state)
}

pub fn build_provisioning_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/internal/zones",
            axum::routing::get(api::zones::list_zones),
        )
        .route(
            "/internal/zones/:zone_id",
            axum::routing::put(api::zones::put_zone).delete(api::zones::delete_zone),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
