//! Signing-key exposure primitives for multi-zone token issuers.
//!
//! # Purpose
//! Publishes, per zone, what a relying party needs to verify that zone's
//! tokens: RSA public components to everyone, symmetric secrets only to
//! privileged callers.
//!
//! # How it fits
//! The key server loads zone snapshots from its store, builds a
//! [`ZoneContext`] and drives [`KeyProjection`] through [`respond`] so the
//! entity-tag comparison happens before any key material is touched.
//!
//! # Key invariants
//! - Key classification is a pure function of the configured material.
//! - Symmetric secrets never reach unprivileged callers.
//! - A resolved key set is never empty.
//!
//! # Examples
//! ```rust
//! use std::collections::BTreeMap;
//!
//! use chrono::Utc;
//! use zonekeys::{
//!     AccessPolicy, KeyProjection, Principal, TokenPolicy, ZoneContext, ZoneKeyRegistry,
//!     ZoneSnapshot,
//! };
//!
//! let zone = ZoneSnapshot {
//!     zone_id: "uaa".to_string(),
//!     token_policy: TokenPolicy::new(
//!         BTreeMap::from([("someKeyId".to_string(), "someKey".to_string())]),
//!         None,
//!     ),
//!     last_modified: Utc::now(),
//! };
//! let ctx = ZoneContext::for_default(zone);
//! let projection = KeyProjection::new(
//!     ZoneKeyRegistry::new("legacy-token-key", "tokenKey"),
//!     AccessPolicy::default(),
//! );
//! let keys = projection.resolve(&ctx);
//! assert!(projection.get_all(&keys, &Principal::anonymous()).is_empty());
//! ```
//!
//! # Common pitfalls
//! - Caching a rendered key set across callers leaks secrets; the filtered
//!   result depends on the principal.

mod classifier;
mod errors;
mod freshness;
mod jwks;
mod policy;
mod projection;
mod registry;
mod zone;

pub use classifier::{KeyEntry, KeyKind, KeyMaterial, classify};
pub use errors::{ZoneKeysError, ZoneKeysResult};
pub use freshness::{Conditional, FreshnessToken, respond};
pub use jwks::{Jwk, Jwks, KeyType, KeyUse};
pub use policy::{AccessPolicy, DEFAULT_KEY_AUTHORITY, Principal};
pub use projection::KeyProjection;
pub use registry::{DEFAULT_KEY_ID, KeySource, ResolvedKeys, ZoneKeyRegistry};
pub use zone::{TokenPolicy, ZoneContext, ZoneSnapshot};
