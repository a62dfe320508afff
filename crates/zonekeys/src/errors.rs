use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZoneKeysError {
    /// A single symmetric key was requested by a caller without the key
    /// authority. `authenticated` records whether the caller proved any
    /// identity at all, which decides between 401 and 403 at the HTTP edge.
    #[error("access denied to symmetric signing key {kid}")]
    AccessDenied { kid: String, authenticated: bool },
    #[error("signing key {kid} cannot be used for verification: {source}")]
    InvalidKey {
        kid: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
}

pub type ZoneKeysResult<T> = Result<T, ZoneKeysError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            ZoneKeysError::AccessDenied {
                kid: "k1".to_string(),
                authenticated: false,
            },
            ZoneKeysError::InvalidKey {
                kid: "k2".to_string(),
                source: jsonwebtoken::errors::ErrorKind::InvalidKeyFormat.into(),
            },
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn access_denied_names_the_key() {
        let err = ZoneKeysError::AccessDenied {
            kid: "someKeyId".to_string(),
            authenticated: true,
        };
        assert_eq!(
            err.to_string(),
            "access denied to symmetric signing key someKeyId"
        );
    }
}
