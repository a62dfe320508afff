//! Key material classification.
//!
//! # Purpose
//! Turns one configured `(key id, raw material)` pair into a [`KeyEntry`]:
//! PEM-encoded RSA private keys become asymmetric RS256 entries carrying only
//! their public modulus and exponent, anything else is an opaque HS256 secret.
//!
//! # Key invariants
//! - Classification is a pure function of the raw material.
//! - Parse failure is a classification outcome, never an error.
//! - Modulus and exponent are big-endian bytes encoded as base64url without
//!   padding.
//! - Private RSA components never leave this module.
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jsonwebtoken::{Algorithm, DecodingKey};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::traits::PublicKeyParts;

use crate::errors::{ZoneKeysError, ZoneKeysResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Symmetric,
    Asymmetric,
}

/// Classified key material.
#[derive(Clone, PartialEq, Eq)]
pub enum KeyMaterial {
    Symmetric { value: String },
    Asymmetric { modulus: String, exponent: String },
}

// Secrets must not end up in logs through `{:?}`.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyMaterial::Symmetric { .. } => f
                .debug_struct("Symmetric")
                .field("value", &"<redacted>")
                .finish(),
            KeyMaterial::Asymmetric { modulus, exponent } => f
                .debug_struct("Asymmetric")
                .field("modulus", modulus)
                .field("exponent", exponent)
                .finish(),
        }
    }
}

/// One classified signing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEntry {
    pub id: String,
    pub material: KeyMaterial,
}

impl KeyEntry {
    pub fn kind(&self) -> KeyKind {
        match self.material {
            KeyMaterial::Symmetric { .. } => KeyKind::Symmetric,
            KeyMaterial::Asymmetric { .. } => KeyKind::Asymmetric,
        }
    }

    pub fn is_symmetric(&self) -> bool {
        self.kind() == KeyKind::Symmetric
    }

    pub fn algorithm(&self) -> Algorithm {
        match self.kind() {
            KeyKind::Symmetric => Algorithm::HS256,
            KeyKind::Asymmetric => Algorithm::RS256,
        }
    }

    /// Build a verification key for tokens signed with this entry.
    pub fn decoding_key(&self) -> ZoneKeysResult<DecodingKey> {
        match &self.material {
            KeyMaterial::Symmetric { value } => Ok(DecodingKey::from_secret(value.as_bytes())),
            KeyMaterial::Asymmetric { modulus, exponent } => {
                DecodingKey::from_rsa_components(modulus, exponent).map_err(|source| {
                    ZoneKeysError::InvalidKey {
                        kid: self.id.clone(),
                        source,
                    }
                })
            }
        }
    }
}

/// Classify one configured key.
///
/// RSA private keys are accepted in PKCS#1 (`BEGIN RSA PRIVATE KEY`) and
/// PKCS#8 (`BEGIN PRIVATE KEY`) PEM form. Every other string, including
/// malformed PEM, is returned verbatim as a symmetric secret.
///
/// # Examples
/// ```rust
/// use zonekeys::{KeyKind, classify};
///
/// let entry = classify("someKeyId", "someKey");
/// assert_eq!(entry.kind(), KeyKind::Symmetric);
/// assert_eq!(entry.algorithm(), jsonwebtoken::Algorithm::HS256);
/// ```
pub fn classify(id: &str, raw: &str) -> KeyEntry {
    let material = match parse_rsa_private_key(raw) {
        Some(key) => KeyMaterial::Asymmetric {
            modulus: URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
            exponent: URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
        },
        None => KeyMaterial::Symmetric {
            value: raw.to_string(),
        },
    };
    KeyEntry {
        id: id.to_string(),
        material,
    }
}

fn parse_rsa_private_key(raw: &str) -> Option<RsaPrivateKey> {
    let pem = raw.trim();
    if !pem.starts_with("-----BEGIN") {
        return None;
    }
    RsaPrivateKey::from_pkcs1_pem(pem)
        .ok()
        .or_else(|| RsaPrivateKey::from_pkcs8_pem(pem).ok())
}
