use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zonekeys::{TokenPolicy, ZoneSnapshot};

/// Caller-supplied zone contents. The store assigns `last_modified`.
#[derive(Debug, Clone)]
pub struct ZoneDefinition {
    pub zone_id: String,
    pub name: String,
    pub token_policy: TokenPolicy,
}

/// Stored zone record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    pub zone_id: String,
    pub name: String,
    pub token_policy: TokenPolicy,
    pub last_modified: DateTime<Utc>,
}

impl Zone {
    pub fn snapshot(&self) -> ZoneSnapshot {
        ZoneSnapshot {
            zone_id: self.zone_id.clone(),
            token_policy: self.token_policy.clone(),
            last_modified: self.last_modified,
        }
    }

    pub fn summary(&self) -> ZoneSummary {
        ZoneSummary {
            zone_id: self.zone_id.clone(),
            name: self.name.clone(),
            key_ids: self.token_policy.keys.keys().cloned().collect(),
            active_key_id: self.token_policy.active_key_id.clone(),
            last_modified: self.last_modified,
        }
    }
}

/// Zone metadata without key material.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct ZoneSummary {
    pub zone_id: String,
    pub name: String,
    pub key_ids: Vec<String>,
    pub active_key_id: Option<String>,
    pub last_modified: DateTime<Utc>,
}
