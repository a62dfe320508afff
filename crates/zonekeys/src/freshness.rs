//! Conditional responses keyed to zone configuration freshness.
//!
//! # Purpose
//! Derives an entity tag from a zone's last-modified timestamp and decides,
//! before any key work happens, whether a caller's cached copy is current.
//!
//! # Key invariants
//! - Identical configuration state yields byte-identical tokens.
//! - A zone whose key resolution reads the default zone (borrowed keys, or an
//!   active key chosen by the default zone) changes token when the default
//!   zone changes.
//! - The comparison is a string compare; the compute closure is not called on
//!   a match.
use std::fmt;

use crate::zone::ZoneContext;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FreshnessToken(String);

impl FreshnessToken {
    pub fn for_context(ctx: &ZoneContext) -> Self {
        let mut last_modified = ctx.zone.last_modified;
        if ctx.reads_default_zone() {
            if let Some(default_zone) = &ctx.default_zone {
                last_modified = last_modified.max(default_zone.last_modified);
            }
        }
        FreshnessToken(last_modified.timestamp_millis().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quoted form for the `ETag` response header.
    pub fn header_value(&self) -> String {
        format!("\"{}\"", self.0)
    }

    /// Compare against an `If-None-Match` value. Accepts quoted or bare tags,
    /// weak tags, comma separated lists and `*`.
    pub fn matches(&self, if_none_match: &str) -> bool {
        if_none_match.split(',').map(str::trim).any(|candidate| {
            if candidate == "*" {
                return true;
            }
            let candidate = candidate.strip_prefix("W/").unwrap_or(candidate);
            let candidate = candidate
                .strip_prefix('"')
                .and_then(|tag| tag.strip_suffix('"'))
                .unwrap_or(candidate);
            candidate == self.0
        })
    }
}

impl fmt::Display for FreshnessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a conditional read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional<T> {
    NotModified(FreshnessToken),
    Fresh { body: T, token: FreshnessToken },
}

impl<T> Conditional<T> {
    pub fn token(&self) -> &FreshnessToken {
        match self {
            Conditional::NotModified(token) | Conditional::Fresh { token, .. } => token,
        }
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, Conditional::NotModified(_))
    }
}

/// Short-circuit on a matching token, otherwise run `compute`.
pub fn respond<T, E, F>(
    ctx: &ZoneContext,
    supplied: Option<&str>,
    compute: F,
) -> Result<Conditional<T>, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let token = FreshnessToken::for_context(ctx);
    if supplied.is_some_and(|supplied| token.matches(supplied)) {
        return Ok(Conditional::NotModified(token));
    }
    let body = compute()?;
    Ok(Conditional::Fresh { body, token })
}
