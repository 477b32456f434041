// ── Runtime session configuration ──
//
// Describes how to reach and authenticate with the marketplace API.
// Carries credential data but never touches disk: the CLI builds a
// `SessionConfig` from its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the backend.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// A bearer token issued earlier by `POST /auth/login`.
    Token(SecretString),
    /// Log in at connect time and use the issued token for this session.
    Credentials {
        email: String,
        password: SecretString,
    },
    /// Catalog browsing only.
    #[default]
    Anonymous,
}

impl AuthCredentials {
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file (PEM).
    CustomCa(PathBuf),
    /// Skip verification. Local development backends only.
    DangerAcceptInvalid,
}

/// Configuration for one session against one backend.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// API root, e.g. `https://skillmart.example/api`.
    pub api_url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fetch `/auth/me` on connect when a token is configured.
    pub fetch_profile: bool,
}

impl SessionConfig {
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url,
            auth: AuthCredentials::Anonymous,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            fetch_profile: true,
        }
    }

    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = auth;
        self
    }
}
