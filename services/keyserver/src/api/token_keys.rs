//! Token key endpoint handlers.
//!
//! # Purpose
//! Serves the verification keys of a zone: the active key on `token_key`, every
//! key on `token_keys`. Unzoned paths serve the default zone.
//!
//! # Key invariants
//! - The `If-None-Match` comparison runs before the caller is authenticated or
//!   any key material is classified.
//! - Symmetric secrets reach only callers holding the key authority. A single
//!   symmetric key is refused (401 anonymous, 403 authenticated); listings
//!   drop symmetric keys instead.
//! - Every response, including 304, carries `ETag` and `Vary: Authorization`.
//!
//! # Security considerations
//! Bodies differ per caller, so intermediaries must key caches on
//! `Authorization`. Key material is never logged.
use crate::api::error::{ApiError, api_forbidden, api_internal_message, api_unauthorized};
use crate::api::load_zone_context;
use crate::app::AppState;
use crate::auth::bearer;
use crate::observability;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, ETAG, HeaderName, IF_NONE_MATCH, VARY};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use zonekeys::{
    Conditional, FreshnessToken, Jwk, Jwks, Principal, ResolvedKeys, ZoneContext, ZoneKeysError,
};

const TOKEN_KEY: &str = "token_key";
const TOKEN_KEYS: &str = "token_keys";

#[utoipa::path(
    get,
    path = "/token_key",
    tag = "keys",
    params(
        ("If-None-Match" = Option<String>, Header, description = "Previously returned ETag")
    ),
    responses(
        (status = 200, description = "Active signing key of the default zone", body = Jwk),
        (status = 304, description = "Zone keys unchanged"),
        (status = 401, description = "Symmetric key requested anonymously or invalid bearer token"),
        (status = 403, description = "Caller lacks the key authority")
    )
)]
pub async fn default_token_key(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let zone_id = state.default_zone_id.clone();
    serve_token_key(&state, &zone_id, &headers).await
}

#[utoipa::path(
    get,
    path = "/token_keys",
    tag = "keys",
    params(
        ("If-None-Match" = Option<String>, Header, description = "Previously returned ETag")
    ),
    responses(
        (status = 200, description = "Signing keys of the default zone visible to the caller", body = Jwks),
        (status = 304, description = "Zone keys unchanged"),
        (status = 401, description = "Invalid bearer token")
    )
)]
pub async fn default_token_keys(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let zone_id = state.default_zone_id.clone();
    serve_token_keys(&state, &zone_id, &headers).await
}

#[utoipa::path(
    get,
    path = "/v1/zones/{zone_id}/token_key",
    tag = "keys",
    params(
        ("zone_id" = String, Path, description = "Zone identifier"),
        ("If-None-Match" = Option<String>, Header, description = "Previously returned ETag")
    ),
    responses(
        (status = 200, description = "Active signing key of the zone", body = Jwk),
        (status = 304, description = "Zone keys unchanged"),
        (status = 401, description = "Symmetric key requested anonymously or invalid bearer token"),
        (status = 403, description = "Caller lacks the key authority"),
        (status = 404, description = "Unknown zone")
    )
)]
pub async fn zone_token_key(
    Path(zone_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_token_key(&state, &zone_id, &headers).await
}

#[utoipa::path(
    get,
    path = "/v1/zones/{zone_id}/token_keys",
    tag = "keys",
    params(
        ("zone_id" = String, Path, description = "Zone identifier"),
        ("If-None-Match" = Option<String>, Header, description = "Previously returned ETag")
    ),
    responses(
        (status = 200, description = "Signing keys of the zone visible to the caller", body = Jwks),
        (status = 304, description = "Zone keys unchanged"),
        (status = 401, description = "Invalid bearer token"),
        (status = 404, description = "Unknown zone")
    )
)]
pub async fn zone_token_keys(
    Path(zone_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    serve_token_keys(&state, &zone_id, &headers).await
}

async fn serve_token_key(
    state: &AppState,
    zone_id: &str,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let result = token_key(state, zone_id, headers).await;
    record_outcome(TOKEN_KEY, &result);
    result.map(render)
}

async fn serve_token_keys(
    state: &AppState,
    zone_id: &str,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let result = token_keys(state, zone_id, headers).await;
    record_outcome(TOKEN_KEYS, &result);
    result.map(render)
}

async fn token_key(
    state: &AppState,
    zone_id: &str,
    headers: &HeaderMap,
) -> Result<Conditional<Jwk>, ApiError> {
    let ctx = load_zone_context(state, zone_id).await?;
    zonekeys::respond(&ctx, if_none_match(headers), || {
        let keys = state.projection.resolve(&ctx);
        let principal = authenticate_caller(state, &ctx, &keys, headers)?;
        let entry = state
            .projection
            .get_one(&keys, &principal)
            .map_err(key_error)?;
        Ok(Jwk::from(entry))
    })
}

async fn token_keys(
    state: &AppState,
    zone_id: &str,
    headers: &HeaderMap,
) -> Result<Conditional<Jwks>, ApiError> {
    let ctx = load_zone_context(state, zone_id).await?;
    zonekeys::respond(&ctx, if_none_match(headers), || {
        let keys = state.projection.resolve(&ctx);
        let principal = authenticate_caller(state, &ctx, &keys, headers)?;
        let jwks: Jwks = state
            .projection
            .get_all(&keys, &principal)
            .into_iter()
            .collect();
        Ok(jwks)
    })
}

fn if_none_match(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
}

fn authenticate_caller(
    state: &AppState,
    ctx: &ZoneContext,
    keys: &ResolvedKeys,
    headers: &HeaderMap,
) -> Result<Principal, ApiError> {
    if !headers.contains_key(AUTHORIZATION) {
        return Ok(Principal::anonymous());
    }
    let verification_keys = state.projection.verification_keys(keys);
    bearer::authenticate(headers, &verification_keys, &keys.active_key_id).map_err(|err| {
        tracing::debug!(
            zone_id = %ctx.zone.zone_id,
            error = %err,
            "bearer authentication failed"
        );
        api_unauthorized("invalid bearer token")
    })
}

fn key_error(err: ZoneKeysError) -> ApiError {
    match err {
        ZoneKeysError::AccessDenied { kid, authenticated } => {
            tracing::debug!(%kid, authenticated, "symmetric key withheld from caller");
            if authenticated {
                api_forbidden("insufficient authority to read symmetric signing key")
            } else {
                api_unauthorized("authentication required to read symmetric signing key")
            }
        }
        ZoneKeysError::InvalidKey { kid, source } => {
            tracing::error!(%kid, error = %source, "configured signing key is unusable");
            api_internal_message("signing key unusable")
        }
    }
}

fn render<T: Serialize>(outcome: Conditional<T>) -> Response {
    let headers = cache_headers(outcome.token());
    match outcome {
        Conditional::NotModified(_) => (StatusCode::NOT_MODIFIED, headers).into_response(),
        Conditional::Fresh { body, .. } => (headers, Json(body)).into_response(),
    }
}

fn cache_headers(token: &FreshnessToken) -> [(HeaderName, String); 2] {
    [
        (ETAG, token.header_value()),
        (VARY, "Authorization".to_string()),
    ]
}

fn record_outcome<T>(endpoint: &'static str, result: &Result<Conditional<T>, ApiError>) {
    let outcome = match result {
        Ok(Conditional::NotModified(_)) => "not_modified",
        Ok(Conditional::Fresh { .. }) => "ok",
        Err(err) => match err.status {
            StatusCode::UNAUTHORIZED => "unauthorized",
            StatusCode::FORBIDDEN => "forbidden",
            StatusCode::NOT_FOUND => "not_found",
            _ => "error",
        },
    };
    metrics::counter!(
        observability::TOKEN_KEY_REQUESTS,
        "endpoint" => endpoint,
        "outcome" => outcome
    )
    .increment(1);
}
