//! Caller privilege decisions.
//!
//! # Purpose
//! Decides whether a caller may see symmetric signing secrets. Asymmetric keys
//! are public and never pass through this check.
use std::collections::BTreeSet;

/// Authority that grants access to symmetric key material.
pub const DEFAULT_KEY_AUTHORITY: &str = "uaa.resource";

/// Who is asking for keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// No credentials, or an anonymous token. Authorities are recorded but
    /// never grant anything.
    Anonymous { authorities: BTreeSet<String> },
    Authenticated {
        subject: String,
        authorities: BTreeSet<String>,
    },
}

impl Principal {
    pub fn anonymous() -> Self {
        Principal::Anonymous {
            authorities: BTreeSet::new(),
        }
    }

    pub fn authenticated<I, S>(subject: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Principal::Authenticated {
            subject: subject.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::Authenticated { .. })
    }

    pub fn subject(&self) -> Option<&str> {
        match self {
            Principal::Anonymous { .. } => None,
            Principal::Authenticated { subject, .. } => Some(subject.as_str()),
        }
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        match self {
            Principal::Anonymous { authorities } | Principal::Authenticated { authorities, .. } => {
                authorities
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    authority: String,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_AUTHORITY)
    }
}

impl AccessPolicy {
    pub fn new(authority: impl Into<String>) -> Self {
        Self {
            authority: authority.into(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn is_privileged_caller(&self, principal: &Principal) -> bool {
        match principal {
            Principal::Anonymous { .. } => false,
            Principal::Authenticated { authorities, .. } => authorities.contains(&self.authority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_with_authority_is_privileged() {
        let policy = AccessPolicy::default();
        let caller = Principal::authenticated("client", ["uaa.resource"]);
        assert!(policy.is_privileged_caller(&caller));
    }

    #[test]
    fn authenticated_without_authority_is_not_privileged() {
        let policy = AccessPolicy::default();
        let caller = Principal::authenticated("client", ["openid", "scim.read"]);
        assert!(!policy.is_privileged_caller(&caller));
        assert!(caller.is_authenticated());
    }

    #[test]
    fn anonymous_is_never_privileged() {
        let policy = AccessPolicy::default();
        let caller = Principal::Anonymous {
            authorities: ["uaa.resource".to_string()].into_iter().collect(),
        };
        assert!(!policy.is_privileged_caller(&caller));
        assert!(!policy.is_privileged_caller(&Principal::anonymous()));
        assert_eq!(caller.subject(), None);
    }

    #[test]
    fn custom_authority() {
        let policy = AccessPolicy::new("keys.read");
        assert!(policy.is_privileged_caller(&Principal::authenticated("c", ["keys.read"])));
        assert!(!policy.is_privileged_caller(&Principal::authenticated("c", ["uaa.resource"])));
    }
}
