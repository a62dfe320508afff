//! Zone key resolution.
//!
//! # Purpose
//! Decides which configured keys apply to a zone and which of them is active.
//! A zone without keys borrows the default zone's keys; when neither has any,
//! a single symmetric key is synthesized from the service defaults so key
//! listings are never empty.
//!
//! # Key invariants
//! - The resolved map is never empty.
//! - The resolved active key id always names a key in the resolved map.
use std::collections::BTreeMap;

use crate::zone::{TokenPolicy, ZoneContext};

/// Key id used when nothing more specific is configured.
pub const DEFAULT_KEY_ID: &str = "legacy-token-key";

/// Where a zone's resolved keys came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    Zone,
    DefaultZone,
    Synthesized,
}

/// Keys resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKeys {
    pub source: KeySource,
    /// Key id to raw material. Never empty.
    pub keys: BTreeMap<String, String>,
    /// Always names an entry of `keys`.
    pub active_key_id: String,
}

impl ResolvedKeys {
    pub fn active_key(&self) -> (&str, &str) {
        let raw = self
            .keys
            .get(&self.active_key_id)
            .map(String::as_str)
            .unwrap_or_default();
        (&self.active_key_id, raw)
    }
}

#[derive(Debug, Clone)]
pub struct ZoneKeyRegistry {
    default_key_id: String,
    default_secret: String,
}

impl ZoneKeyRegistry {
    pub fn new(default_key_id: impl Into<String>, default_secret: impl Into<String>) -> Self {
        Self {
            default_key_id: default_key_id.into(),
            default_secret: default_secret.into(),
        }
    }

    pub fn default_key_id(&self) -> &str {
        &self.default_key_id
    }

    pub fn key_source(&self, ctx: &ZoneContext) -> KeySource {
        if ctx.zone.token_policy.has_keys() {
            KeySource::Zone
        } else if ctx.default_policy().is_some_and(TokenPolicy::has_keys) {
            KeySource::DefaultZone
        } else {
            KeySource::Synthesized
        }
    }

    /// Resolve the zone's keys and its active key in one pass. Fallback and
    /// synthesis are logged here, once per call.
    pub fn resolve(&self, ctx: &ZoneContext) -> ResolvedKeys {
        let source = self.key_source(ctx);
        let keys = match source {
            KeySource::Zone => ctx.zone.token_policy.keys.clone(),
            KeySource::DefaultZone => {
                tracing::debug!(
                    zone_id = %ctx.zone.zone_id,
                    "zone has no signing keys, using default zone keys"
                );
                ctx.default_policy()
                    .map(|policy| policy.keys.clone())
                    .unwrap_or_default()
            }
            KeySource::Synthesized => {
                tracing::warn!(
                    zone_id = %ctx.zone.zone_id,
                    key_id = %self.default_key_id,
                    "no signing keys configured, serving synthesized default key"
                );
                self.synthesized_keys()
            }
        };
        let active_key_id = self.active_key_id_in(ctx, source, &keys);
        ResolvedKeys {
            source,
            keys,
            active_key_id,
        }
    }

    fn active_key_id_in(
        &self,
        ctx: &ZoneContext,
        source: KeySource,
        keys: &BTreeMap<String, String>,
    ) -> String {
        let source_policy = match source {
            KeySource::Zone => Some(&ctx.zone.token_policy),
            KeySource::DefaultZone => ctx.default_policy(),
            KeySource::Synthesized => None,
        };

        if let Some(kid) = source_policy.and_then(TokenPolicy::configured_active_key) {
            return kid.to_string();
        }
        if keys.len() == 1 {
            return keys.keys().next().cloned().unwrap_or_default();
        }
        // Reached with zone-owned keys too; FreshnessToken tracks this case.
        if let Some(kid) = ctx
            .default_policy()
            .and_then(|policy| policy.active_key_id.as_deref())
            .filter(|kid| keys.contains_key(*kid))
        {
            return kid.to_string();
        }
        if keys.contains_key(DEFAULT_KEY_ID) {
            return DEFAULT_KEY_ID.to_string();
        }
        keys.keys()
            .next()
            .cloned()
            .unwrap_or_else(|| self.default_key_id.clone())
    }

    fn synthesized_keys(&self) -> BTreeMap<String, String> {
        BTreeMap::from([(self.default_key_id.clone(), self.default_secret.clone())])
    }
}
