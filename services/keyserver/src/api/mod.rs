//! Key server HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules and the shared helper that loads the zone
//! context a key request runs against.
pub mod error;
pub mod openapi;
pub mod system;
pub mod token_keys;
pub mod types;
pub mod zones;

use crate::api::error::{ApiError, api_internal, api_not_found};
use crate::app::AppState;
use crate::store::StoreError;
use zonekeys::ZoneContext;

/// Snapshot the zone and the default zone it may fall back to.
pub(crate) async fn load_zone_context(
    state: &AppState,
    zone_id: &str,
) -> Result<ZoneContext, ApiError> {
    let zone = match state.store.get_zone(zone_id).await {
        Ok(zone) => zone.snapshot(),
        Err(StoreError::NotFound(_)) => return Err(api_not_found("zone not found")),
        Err(err) => return Err(api_internal("failed to load zone", &err)),
    };
    if zone_id == state.default_zone_id {
        return Ok(ZoneContext::for_default(zone));
    }
    let default_zone = match state.store.get_zone(&state.default_zone_id).await {
        Ok(default_zone) => Some(default_zone.snapshot()),
        Err(StoreError::NotFound(_)) => None,
        Err(err) => return Err(api_internal("failed to load default zone", &err)),
    };
    Ok(ZoneContext::new(zone, default_zone))
}
