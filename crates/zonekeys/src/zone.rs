//! Zone configuration snapshots consumed by key resolution.
//!
//! # Purpose
//! Carries the slice of a zone's configuration this crate reads: the ordered
//! key-id to raw-material map, the designated active key and the
//! last-modified timestamp that drives conditional responses.
//!
//! # Key invariants
//! - Snapshots are owned copies; a request never observes a concurrent
//!   provisioning write halfway through.
//! - Key ids are unique within a zone by construction (map keys).
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signing-key portion of a zone's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPolicy {
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_key_id: Option<String>,
}

impl TokenPolicy {
    pub fn new(keys: BTreeMap<String, String>, active_key_id: Option<String>) -> Self {
        Self {
            keys,
            active_key_id,
        }
    }

    pub fn has_keys(&self) -> bool {
        !self.keys.is_empty()
    }

    /// The configured active key id, if it names a configured key.
    pub fn configured_active_key(&self) -> Option<&str> {
        self.active_key_id
            .as_deref()
            .filter(|kid| self.keys.contains_key(*kid))
    }
}

/// Point-in-time copy of one zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneSnapshot {
    pub zone_id: String,
    pub token_policy: TokenPolicy,
    pub last_modified: DateTime<Utc>,
}

/// Explicit zone context handed to every key operation.
///
/// `default_zone` is the zone whose keys back any zone without its own. It is
/// `None` only when no default zone record exists, which resolves the same way
/// as a default zone with no keys.
#[derive(Debug, Clone)]
pub struct ZoneContext {
    pub zone: ZoneSnapshot,
    pub default_zone: Option<ZoneSnapshot>,
}

impl ZoneContext {
    pub fn new(zone: ZoneSnapshot, default_zone: Option<ZoneSnapshot>) -> Self {
        Self { zone, default_zone }
    }

    /// Context for the default zone itself.
    pub fn for_default(zone: ZoneSnapshot) -> Self {
        Self {
            default_zone: Some(zone.clone()),
            zone,
        }
    }

    /// True when key resolution for this zone reads the default zone: the zone
    /// has no keys of its own, or it has several and none designated active so
    /// the default zone's active id may choose between them.
    pub fn reads_default_zone(&self) -> bool {
        if self.zone.zone_id == self.default_zone_id().unwrap_or_default() {
            return false;
        }
        let policy = &self.zone.token_policy;
        !policy.has_keys() || (policy.keys.len() > 1 && policy.configured_active_key().is_none())
    }

    fn default_zone_id(&self) -> Option<&str> {
        self.default_zone.as_ref().map(|zone| zone.zone_id.as_str())
    }

    pub fn default_policy(&self) -> Option<&TokenPolicy> {
        self.default_zone.as_ref().map(|zone| &zone.token_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot(zone_id: &str, keys: &[(&str, &str)]) -> ZoneSnapshot {
        ZoneSnapshot {
            zone_id: zone_id.to_string(),
            token_policy: TokenPolicy::new(
                keys.iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                None,
            ),
            last_modified: Utc.timestamp_millis_opt(1_000).unwrap(),
        }
    }

    #[test]
    fn configured_active_key_requires_known_id() {
        let mut policy = TokenPolicy::new(
            [("k1".to_string(), "secret".to_string())].into_iter().collect(),
            Some("k2".to_string()),
        );
        assert_eq!(policy.configured_active_key(), None);
        policy.active_key_id = Some("k1".to_string());
        assert_eq!(policy.configured_active_key(), Some("k1"));
    }

    #[test]
    fn reads_default_zone_when_it_can_influence_resolution() {
        let default = snapshot("uaa", &[("k1", "secret")]);
        let ctx = ZoneContext::new(snapshot("test-zone", &[]), Some(default.clone()));
        assert!(ctx.reads_default_zone());

        let ctx = ZoneContext::new(snapshot("test-zone", &[("k2", "s2")]), Some(default.clone()));
        assert!(!ctx.reads_default_zone());

        let several = snapshot("test-zone", &[("a", "1"), ("b", "2")]);
        let ctx = ZoneContext::new(several.clone(), Some(default.clone()));
        assert!(ctx.reads_default_zone());

        let mut designated = several;
        designated.token_policy.active_key_id = Some("b".to_string());
        let ctx = ZoneContext::new(designated, Some(default));
        assert!(!ctx.reads_default_zone());

        let ctx = ZoneContext::for_default(snapshot("uaa", &[]));
        assert!(!ctx.reads_default_zone());
    }

    #[test]
    fn token_policy_deserializes_without_keys() {
        let policy: TokenPolicy = serde_json::from_str("{}").unwrap();
        assert!(!policy.has_keys());
        assert!(policy.active_key_id.is_none());
    }
}
