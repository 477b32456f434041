//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use skillmart_config::ConfigError;
use skillmart_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the SkillMart API at {url}")]
    #[diagnostic(
        code(skillmart::connection_failed),
        help(
            "Check that the backend is running and the URL is right.\n\
             Reason: {reason}\n\
             Try: skillmart --api-url http://localhost:5000/api courses list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(skillmart::timeout),
        help("Increase the timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(skillmart::auth_failed),
        help("Log in again with: skillmart login --profile {profile}")
    )]
    AuthFailed { message: String, profile: String },

    #[error("You need to log in to use {action}")]
    #[diagnostic(
        code(skillmart::login_required),
        help("Run: skillmart login\nOr pass a token with --token / SKILLMART_TOKEN.")
    )]
    LoginRequired { action: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(skillmart::no_credentials),
        help(
            "Run: skillmart login --profile {profile}\n\
             Or store a token with: skillmart config set-token"
        )
    )]
    NoCredentials { profile: String },

    #[error("{message}")]
    #[diagnostic(
        code(skillmart::forbidden),
        help("Your account role does not allow this action.")
    )]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(skillmart::not_found))]
    NotFound { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(skillmart::api_error), help("Run with -v for details."))]
    ApiError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(skillmart::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid input: {message}")]
    #[diagnostic(code(skillmart::invalid_input))]
    InvalidInput { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(skillmart::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: skillmart config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(skillmart::no_config),
        help(
            "Create a profile with: skillmart config init\n\
             Or pass --api-url. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(skillmart::config))]
    Config { message: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(skillmart::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::LoginRequired { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::InvalidInput { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Fill in the profile name and configured timeout, which core errors
    /// do not know.
    pub fn in_context(self, profile: &str, timeout_secs: u64) -> Self {
        match self {
            Self::AuthFailed { message, .. } => Self::AuthFailed {
                message,
                profile: profile.to_owned(),
            },
            Self::Timeout { seconds: 0 } => Self::Timeout {
                seconds: timeout_secs,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        tracing::debug!(error = %err, "core error");
        let message = err.user_message();

        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::SessionClosed => CliError::ConnectionFailed {
                url: "(session)".into(),
                reason: "the session was closed".into(),
            },
            CoreError::AuthenticationFailed { .. } => CliError::AuthFailed {
                message,
                profile: "default".into(),
            },
            CoreError::NotAuthenticated { action } => CliError::LoginRequired { action },
            CoreError::Forbidden { .. } => CliError::Forbidden { message },
            CoreError::NotFound { message: detail } => CliError::NotFound {
                message: detail.unwrap_or_else(|| "Not found".into()),
            },
            CoreError::ValidationFailed { .. } => CliError::InvalidInput { message },
            CoreError::Config { message } => CliError::Config { message },
            CoreError::Api { .. } | CoreError::Internal(_) => CliError::ApiError { message },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use skillmart_core::ValidationError;

    #[test]
    fn exit_codes_follow_error_class() {
        let invalid = CliError::from(CoreError::validation(vec![ValidationError {
            field: "code",
            reason: "may only contain uppercase letters and digits".into(),
        }]));
        assert_eq!(invalid.exit_code(), exit_code::USAGE);
        assert_eq!(
            invalid.to_string(),
            "Invalid input: code may only contain uppercase letters and digits"
        );

        let login = CliError::from(CoreError::NotAuthenticated {
            action: "cart".into(),
        });
        assert_eq!(login.exit_code(), exit_code::AUTH);

        let forbidden = CliError::from(CoreError::Forbidden {
            message: "Instructor access required".into(),
        });
        assert_eq!(forbidden.exit_code(), exit_code::PERMISSION);
        assert_eq!(forbidden.to_string(), "Instructor access required");
    }

    #[test]
    fn raw_api_failures_use_generic_message() {
        let err = CliError::from(CoreError::Api {
            message: "<html>502</html>".into(),
            code: None,
            status: Some(502),
            from_server: false,
        });
        assert_eq!(err.to_string(), skillmart_core::error::GENERIC_FAILURE);
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn context_fills_profile_and_timeout() {
        let err = CliError::from(CoreError::Timeout { timeout_secs: 0 }).in_context("prod", 45);
        assert!(matches!(err, CliError::Timeout { seconds: 45 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);

        let err = CliError::AuthFailed {
            message: "expired".into(),
            profile: "default".into(),
        }
        .in_context("prod", 45);
        assert!(matches!(err, CliError::AuthFailed { ref profile, .. } if profile == "prod"));
    }
}
