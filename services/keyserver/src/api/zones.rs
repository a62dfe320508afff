//! Zone provisioning handlers.
//!
//! # Purpose
//! Internal, token-guarded API for creating, replacing, listing and deleting
//! zones and their signing-key configuration. Served on a separate listener
//! and only when provisioning is enabled.
//!
//! # Security considerations
//! - Requests must present `X-Keyserver-Provisioning-Token`, compared in
//!   constant time.
//! - Responses never echo key material; listings return key ids only.
use crate::api::error::{
    ApiError, api_conflict, api_internal, api_internal_message, api_not_enabled, api_not_found,
    api_unauthorized, api_validation_error,
};
use crate::api::types::{ZoneListResponse, ZoneUpsertRequest};
use crate::app::AppState;
use crate::model::{ZoneDefinition, ZoneSummary};
use crate::store::StoreError;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use zonekeys::TokenPolicy;

pub const PROVISIONING_TOKEN_HEADER: &str = "X-Keyserver-Provisioning-Token";

#[utoipa::path(
    put,
    path = "/internal/zones/{zone_id}",
    tag = "provisioning",
    params(("zone_id" = String, Path, description = "Zone identifier")),
    request_body = ZoneUpsertRequest,
    responses(
        (status = 201, description = "Zone created", body = ZoneSummary),
        (status = 200, description = "Zone replaced", body = ZoneSummary),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not enabled")
    )
)]
pub async fn put_zone(
    Path(zone_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<ZoneUpsertRequest>,
) -> Result<(StatusCode, Json<ZoneSummary>), ApiError> {
    ensure_provisioning_authorized(&state, &headers)?;
    let definition = validate_zone(&zone_id, body)?;

    let exists = state
        .store
        .zone_exists(&zone_id)
        .await
        .map_err(|err| api_internal("failed to check zone", &err))?;
    let (status, zone) = if exists {
        let zone = state
            .store
            .update_zone(definition)
            .await
            .map_err(|err| api_internal("failed to update zone", &err))?;
        (StatusCode::OK, zone)
    } else {
        let zone = match state.store.create_zone(definition).await {
            Ok(zone) => zone,
            Err(StoreError::Conflict(_)) => {
                return Err(api_conflict("zone_exists", "zone was created concurrently"));
            }
            Err(err) => return Err(api_internal("failed to create zone", &err)),
        };
        (StatusCode::CREATED, zone)
    };

    tracing::info!(
        zone_id = %zone.zone_id,
        key_count = zone.token_policy.keys.len(),
        active_key_id = ?zone.token_policy.active_key_id,
        "zone signing keys provisioned"
    );
    Ok((status, Json(zone.summary())))
}

#[utoipa::path(
    get,
    path = "/internal/zones",
    tag = "provisioning",
    responses(
        (status = 200, description = "Zone summaries", body = ZoneListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not enabled")
    )
)]
pub async fn list_zones(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ZoneListResponse>, ApiError> {
    ensure_provisioning_authorized(&state, &headers)?;
    let zones = state
        .store
        .list_zones()
        .await
        .map_err(|err| api_internal("failed to list zones", &err))?;
    Ok(Json(ZoneListResponse {
        items: zones.iter().map(|zone| zone.summary()).collect(),
    }))
}

#[utoipa::path(
    delete,
    path = "/internal/zones/{zone_id}",
    tag = "provisioning",
    params(("zone_id" = String, Path, description = "Zone identifier")),
    responses(
        (status = 204, description = "Zone deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Zone not found or provisioning not enabled"),
        (status = 409, description = "Default zone cannot be deleted")
    )
)]
pub async fn delete_zone(
    Path(zone_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    ensure_provisioning_authorized(&state, &headers)?;
    if zone_id == state.default_zone_id {
        return Err(api_conflict(
            "default_zone",
            "the default zone cannot be deleted",
        ));
    }
    match state.store.delete_zone(&zone_id).await {
        Ok(()) => {
            tracing::info!(%zone_id, "zone deleted");
            Ok(StatusCode::NO_CONTENT)
        }
        Err(StoreError::NotFound(_)) => Err(api_not_found("zone not found")),
        Err(err) => Err(api_internal("failed to delete zone", &err)),
    }
}

fn validate_zone(zone_id: &str, body: ZoneUpsertRequest) -> Result<ZoneDefinition, ApiError> {
    if zone_id.trim().is_empty() {
        return Err(api_validation_error("zone_id is required"));
    }
    for (kid, material) in &body.keys {
        if kid.trim().is_empty() {
            return Err(api_validation_error("key ids must not be empty"));
        }
        if material.trim().is_empty() {
            return Err(api_validation_error("key material must not be empty"));
        }
    }
    if let Some(active) = &body.active_key_id {
        if !body.keys.contains_key(active) {
            return Err(api_validation_error(
                "active_key_id must name a configured key",
            ));
        }
    }
    let name = body
        .name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| zone_id.to_string());
    Ok(ZoneDefinition {
        zone_id: zone_id.to_string(),
        name,
        token_policy: TokenPolicy::new(body.keys, body.active_key_id),
    })
}

fn ensure_provisioning_authorized(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if !state.provisioning_enabled {
        return Err(api_not_enabled("provisioning not enabled"));
    }

    let token = match headers.get(PROVISIONING_TOKEN_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| api_unauthorized("invalid provisioning token"))?,
        None => return Err(api_unauthorized("missing provisioning token")),
    };

    let expected = state
        .provisioning_token
        .as_ref()
        .ok_or_else(|| api_internal_message("provisioning token missing"))?;

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        return Err(api_unauthorized("invalid provisioning token"));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request(keys: &[(&str, &str)], active: Option<&str>) -> ZoneUpsertRequest {
        ZoneUpsertRequest {
            name: None,
            keys: keys
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            active_key_id: active.map(str::to_string),
        }
    }

    #[test]
    fn constant_time_eq_compares_contents() {
        assert!(constant_time_eq(b"token", b"token"));
        assert!(!constant_time_eq(b"token", b"tokem"));
        assert!(!constant_time_eq(b"token", b"token2"));
    }

    #[test]
    fn validation_accepts_well_formed_zone() {
        let definition =
            validate_zone("test-zone", request(&[("k1", "secret")], Some("k1"))).expect("valid");
        assert_eq!(definition.name, "test-zone");
        assert_eq!(definition.token_policy.active_key_id.as_deref(), Some("k1"));
    }

    #[test]
    fn validation_rejects_bad_input() {
        let cases = vec![
            request(&[("", "secret")], None),
            request(&[("k1", "  ")], None),
            request(&[("k1", "secret")], Some("k2")),
        ];
        for body in cases {
            let err = validate_zone("test-zone", body).expect_err("invalid");
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
    }
}
