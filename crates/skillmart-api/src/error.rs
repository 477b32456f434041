use thiserror::Error;

/// Top-level error type for the `skillmart-api` crate.
///
/// Covers every failure mode of a single HTTP exchange with the
/// marketplace backend. `skillmart-core` maps these into user-facing
/// diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the credentials could not be encoded.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Bearer token missing, expired or revoked (HTTP 401).
    #[error("Invalid or expired token")]
    InvalidToken,

    /// Authenticated, but the role may not perform the action (HTTP 403).
    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An id that cannot be used as a URL path segment.
    #[error("Invalid path segment '{segment}'")]
    InvalidPathSegment { segment: String },

    /// TLS configuration or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success response from the backend.
    ///
    /// `message` is the server-provided message when the body carried
    /// one, otherwise the raw body or status line.
    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        message: String,
        code: Option<String>,
        /// `true` when `message` came from a structured error body.
        from_server: bool,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if re-authenticating might resolve this error.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::InvalidToken)
    }

    /// Returns `true` if this is a transient transport failure.
    ///
    /// Nothing in the workspace retries; the flag only shapes messages.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status associated with the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidToken => Some(401),
            Self::Forbidden { .. } => Some(403),
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The message the backend put in its error body, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message,
                from_server: true,
                ..
            }
            | Self::Forbidden { message }
            | Self::Authentication { message } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Extract the API error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
