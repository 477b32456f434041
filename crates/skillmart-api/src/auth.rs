use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Credentials attached to every request made by a [`MarketplaceClient`].
///
/// The backend issues bearer tokens from `POST /auth/login`; everything
/// else (refresh, expiry) is the backend's business. Catalog endpoints
/// work without a token.
///
/// [`MarketplaceClient`]: crate::MarketplaceClient
#[derive(Debug, Clone, Default)]
pub enum Credentials {
    /// No `Authorization` header. Enough for browsing the catalog.
    #[default]
    Anonymous,
    /// `Authorization: Bearer <token>`.
    Bearer { token: SecretString },
}

impl Credentials {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: SecretString::from(token.into()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// The `Authorization` header value, marked sensitive so it never
    /// shows up in debug output.
    pub fn authorization_header(&self) -> Result<Option<HeaderValue>, Error> {
        match self {
            Self::Anonymous => Ok(None),
            Self::Bearer { token } => {
                let mut value =
                    HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(
                        |e| Error::Authentication {
                            message: format!("invalid token header value: {e}"),
                        },
                    )?;
                value.set_sensitive(true);
                Ok(Some(value))
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_header() {
        assert!(Credentials::Anonymous.authorization_header().unwrap().is_none());
    }

    #[test]
    fn bearer_header_is_sensitive() {
        let value = Credentials::bearer("abc").authorization_header().unwrap().unwrap();
        assert!(value.is_sensitive());
        assert_eq!(value.to_str().unwrap(), "Bearer abc");
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let result = Credentials::bearer("abc\ndef").authorization_header();
        assert!(matches!(result, Err(Error::Authentication { .. })));
    }
}
