use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};

use crate::classifier::{KeyEntry, KeyMaterial};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum KeyUse {
    Sig,
}

impl KeyUse {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyUse::Sig => "sig",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum KeyType {
    #[serde(rename = "MAC")]
    Mac,
    #[serde(rename = "RSA")]
    Rsa,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Mac => "MAC",
            KeyType::Rsa => "RSA",
        }
    }
}

/// Externally visible form of one signing key, as served by the token key
/// endpoints.
///
/// `value` is present only for symmetric keys; `n`/`e` only for RSA keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Jwk {
    pub kid: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "RS256"))]
    pub alg: Algorithm,
    pub kty: KeyType,
    #[serde(rename = "use")]
    pub use_field: KeyUse,
    /// Symmetric secret.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// RSA modulus, base64url without padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA public exponent, base64url without padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Jwks {
    pub keys: Vec<Jwk>,
}

impl From<&KeyEntry> for Jwk {
    fn from(entry: &KeyEntry) -> Self {
        let alg = entry.algorithm();
        match &entry.material {
            KeyMaterial::Symmetric { value } => Jwk {
                kid: entry.id.clone(),
                alg,
                kty: KeyType::Mac,
                use_field: KeyUse::Sig,
                value: Some(value.clone()),
                n: None,
                e: None,
            },
            KeyMaterial::Asymmetric { modulus, exponent } => Jwk {
                kid: entry.id.clone(),
                alg,
                kty: KeyType::Rsa,
                use_field: KeyUse::Sig,
                value: None,
                n: Some(modulus.clone()),
                e: Some(exponent.clone()),
            },
        }
    }
}

impl From<KeyEntry> for Jwk {
    fn from(entry: KeyEntry) -> Self {
        Jwk::from(&entry)
    }
}

impl FromIterator<KeyEntry> for Jwks {
    fn from_iter<I: IntoIterator<Item = KeyEntry>>(iter: I) -> Self {
        Jwks {
            keys: iter.into_iter().map(Jwk::from).collect(),
        }
    }
}
