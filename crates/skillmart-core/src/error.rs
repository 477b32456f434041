// ── Core error types ──
//
// Domain errors from skillmart-core. Consumers never see raw HTTP status
// codes or JSON parse failures; `From<skillmart_api::Error>` translates
// them. `user_message()` is what a view shows inline.

use std::time::Duration;

use thiserror::Error;

use crate::validate::ValidationError;

/// Shown whenever a failure carries no message meant for the user.
pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";

fn join_validation(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the marketplace API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Session is not connected")]
    SessionClosed,

    // ── Auth errors ──────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Login required: {action} needs an authenticated session")]
    NotAuthenticated { action: String },

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {}", .message.as_deref().unwrap_or("the requested resource does not exist"))]
    NotFound { message: Option<String> },

    #[error("Invalid input: {}", join_validation(.errors))]
    ValidationFailed { errors: Vec<ValidationError> },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// Backend error code, when the body carried one.
        code: Option<String>,
        status: Option<u16>,
        /// `true` when `message` is the backend's own wording.
        from_server: bool,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn validation(errors: Vec<ValidationError>) -> Self {
        Self::ValidationFailed { errors }
    }

    /// The inline message for a failed user action: the backend's message
    /// when it sent one, the form errors for invalid input, otherwise
    /// [`GENERIC_FAILURE`].
    pub fn user_message(&self) -> String {
        match self {
            Self::Api {
                message,
                from_server: true,
                ..
            }
            | Self::AuthenticationFailed { message }
            | Self::Forbidden { message }
            | Self::NotFound {
                message: Some(message),
            } => message.clone(),
            Self::ValidationFailed { errors } => join_validation(errors),
            Self::NotAuthenticated { .. } => self.to_string(),
            _ => GENERIC_FAILURE.to_owned(),
        }
    }

    /// Fill in the configured limit on a timeout the transport reported
    /// without one.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match self {
            Self::Timeout { timeout_secs: 0 } => Self::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            other => other,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed { .. } | Self::NotAuthenticated { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<skillmart_api::Error> for CoreError {
    fn from(err: skillmart_api::Error) -> Self {
        use skillmart_api::Error as ApiError;

        if err.is_not_found() {
            return CoreError::NotFound {
                message: err.server_message().map(str::to_owned),
            };
        }

        match err {
            ApiError::Authentication { message } => CoreError::AuthenticationFailed { message },
            ApiError::InvalidToken => CoreError::AuthenticationFailed {
                message: "Your session has expired. Please log in again.".into(),
            },
            ApiError::Forbidden { message } => CoreError::Forbidden { message },
            ApiError::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                        from_server: false,
                    }
                }
            }
            ApiError::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            ApiError::InvalidPathSegment { segment } => {
                CoreError::validation(vec![ValidationError {
                    field: "id",
                    reason: format!("'{segment}' is not a usable id"),
                }])
            }
            ApiError::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            ApiError::Api {
                status,
                message,
                code,
                from_server,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
                from_server,
            },
            ApiError::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response body: {message}"))
            }
        }
    }
}
