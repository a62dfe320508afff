//! Bearer token authentication.
//!
//! # Purpose
//! Verifies bearer JWTs presented to the key endpoints against the zone's own
//! signing keys and derives the caller's principal from the verified claims.
//!
//! # Key invariants
//! - No `Authorization` header means an anonymous caller, not an error.
//! - A present but unusable credential is always an error; it never degrades
//!   to anonymous.
//! - The verification algorithm is pinned to the selected key's classified
//!   algorithm, so an RSA key can never verify an HMAC token or vice versa.
//! - `exp` and `sub` are required.
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use jsonwebtoken::Validation;
use serde::Deserialize;
use std::collections::BTreeSet;
use thiserror::Error;
use zonekeys::{KeyEntry, Principal, ZoneKeysError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header is not valid text")]
    InvalidHeader,
    #[error("unsupported authorization scheme")]
    UnsupportedScheme,
    #[error("bearer token is empty")]
    EmptyToken,
    #[error("unknown signing key {0}")]
    UnknownKey(String),
    #[error("no signing key available")]
    NoKey,
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error(transparent)]
    Key(#[from] ZoneKeysError),
}

/// OAuth scope claim, either a JSON array or a space-delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScopeClaim {
    List(Vec<String>),
    Delimited(String),
}

impl ScopeClaim {
    fn values(&self) -> Vec<String> {
        match self {
            ScopeClaim::List(values) => values.clone(),
            ScopeClaim::Delimited(value) => value.split_whitespace().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: u64,
    #[serde(default)]
    pub scope: Option<ScopeClaim>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl TokenClaims {
    /// Union of `scope` and `authorities`.
    pub fn granted(&self) -> BTreeSet<String> {
        let mut granted: BTreeSet<String> = self.authorities.iter().cloned().collect();
        if let Some(scope) = &self.scope {
            granted.extend(scope.values());
        }
        granted
    }
}

/// The bearer token in `headers`, if any.
pub fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value.to_str().map_err(|_| AuthError::InvalidHeader)?;
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::UnsupportedScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::UnsupportedScheme);
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::EmptyToken);
    }
    Ok(Some(token))
}

/// Authenticate the caller against a zone's verification keys.
///
/// The token's `kid` selects the key; tokens without a `kid` are checked
/// against `active_kid`.
pub fn authenticate(
    headers: &HeaderMap,
    keys: &[KeyEntry],
    active_kid: &str,
) -> Result<Principal, AuthError> {
    let Some(token) = extract_bearer(headers)? else {
        return Ok(Principal::anonymous());
    };
    let claims = verify(token, keys, active_kid)?;
    let authorities = claims.granted();
    Ok(Principal::Authenticated {
        subject: claims.sub,
        authorities,
    })
}

fn verify(token: &str, keys: &[KeyEntry], active_kid: &str) -> Result<TokenClaims, AuthError> {
    let header = jsonwebtoken::decode_header(token)?;
    let key = match header.kid.as_deref() {
        Some(kid) => keys
            .iter()
            .find(|entry| entry.id == kid)
            .ok_or_else(|| AuthError::UnknownKey(kid.to_string()))?,
        None => keys
            .iter()
            .find(|entry| entry.id == active_kid)
            .ok_or(AuthError::NoKey)?,
    };

    let mut validation = Validation::new(key.algorithm());
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation.validate_aud = false;
    let decoding_key = key.decoding_key()?;
    let token = jsonwebtoken::decode::<TokenClaims>(token, &decoding_key, &validation)?;
    Ok(token.claims)
}
