//! Externally visible key sets.
//!
//! # Purpose
//! Combines resolution, classification and the access policy into the two
//! read operations: fetch the active key, or list every key.
//!
//! # Key invariants
//! - A single symmetric key is refused to unprivileged callers, never redacted.
//! - Listings drop symmetric keys for unprivileged callers and never fail.
//! - Entries are derived fresh for every call.
use crate::classifier::{KeyEntry, classify};
use crate::errors::{ZoneKeysError, ZoneKeysResult};
use crate::policy::{AccessPolicy, Principal};
use crate::registry::{ResolvedKeys, ZoneKeyRegistry};
use crate::zone::ZoneContext;

#[derive(Debug, Clone)]
pub struct KeyProjection {
    registry: ZoneKeyRegistry,
    policy: AccessPolicy,
}

impl KeyProjection {
    pub fn new(registry: ZoneKeyRegistry, policy: AccessPolicy) -> Self {
        Self { registry, policy }
    }

    /// Resolve the zone's keys once per request; the read operations below
    /// work on the result.
    pub fn resolve(&self, ctx: &ZoneContext) -> ResolvedKeys {
        self.registry.resolve(ctx)
    }

    /// Classified active key.
    pub fn get_one(&self, keys: &ResolvedKeys, principal: &Principal) -> ZoneKeysResult<KeyEntry> {
        let (kid, raw) = keys.active_key();
        let entry = classify(kid, raw);
        if entry.is_symmetric() && !self.policy.is_privileged_caller(principal) {
            return Err(ZoneKeysError::AccessDenied {
                kid: entry.id,
                authenticated: principal.is_authenticated(),
            });
        }
        Ok(entry)
    }

    /// Every classified key visible to `principal`, in key id order.
    pub fn get_all(&self, keys: &ResolvedKeys, principal: &Principal) -> Vec<KeyEntry> {
        let privileged = self.policy.is_privileged_caller(principal);
        keys.keys
            .iter()
            .map(|(kid, raw)| classify(kid, raw))
            .filter(|entry| privileged || !entry.is_symmetric())
            .collect()
    }

    /// Every classified key regardless of caller, for verifying tokens
    /// presented to the service itself.
    pub fn verification_keys(&self, keys: &ResolvedKeys) -> Vec<KeyEntry> {
        keys.keys
            .iter()
            .map(|(kid, raw)| classify(kid, raw))
            .collect()
    }
}
