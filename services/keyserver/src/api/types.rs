//! HTTP API request/response types.
//!
//! # Purpose
//! Shared payload shapes for the key server REST API and OpenAPI schema
//! generation. Key payloads themselves are `zonekeys::Jwk` / `zonekeys::Jwks`.
use crate::model::ZoneSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub default_zone_id: String,
    pub storage_backend: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ZoneUpsertRequest {
    #[serde(default)]
    pub name: Option<String>,
    /// Key id to raw key material: a symmetric secret or a PEM RSA private key.
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub active_key_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ZoneListResponse {
    pub items: Vec<ZoneSummary>,
}
