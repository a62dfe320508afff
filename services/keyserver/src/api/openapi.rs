//! OpenAPI schema aggregation for the key server API.
//!
//! # Purpose
//! Collects all routes and schema types into a single OpenAPI document served
//! at `/v1/openapi.json`.
use crate::api::{
    system, token_keys,
    types::{
        ErrorResponse, HealthStatus, SystemInfo, ZoneListResponse, ZoneUpsertRequest,
    },
    zones,
};
use crate::model::ZoneSummary;
use axum::Json;
use utoipa::OpenApi;
use zonekeys::{Jwk, Jwks, KeyType, KeyUse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "keyserver",
        version = "v1",
        description = "Per-zone token signing key endpoints"
    ),
    paths(
        system::system_info,
        system::system_health,
        token_keys::default_token_key,
        token_keys::default_token_keys,
        token_keys::zone_token_key,
        token_keys::zone_token_keys,
        zones::put_zone,
        zones::list_zones,
        zones::delete_zone
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        Jwk,
        Jwks,
        KeyType,
        KeyUse,
        ZoneUpsertRequest,
        ZoneSummary,
        ZoneListResponse
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "keys", description = "Token signing key endpoints"),
        (name = "provisioning", description = "Internal zone provisioning")
    )
)]
pub struct ApiDoc;

pub(crate) async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
