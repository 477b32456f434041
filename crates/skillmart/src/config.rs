//! CLI configuration: thin wrapper around `skillmart_config`.
//!
//! Adds the flag overrides (`--api-url`, `--token`, `--insecure`,
//! `--timeout`) on top of what the shared crate resolves from a profile.

use std::time::Duration;

use secrecy::SecretString;

use skillmart_core::{AuthCredentials, SessionConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use skillmart_config::{
    AUTH_MODES, Config, Defaults, Profile, clear_token, config_path, load_config_or_default,
    parse_api_url, save_config, store_password, store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Effective timeout: flag, then profile, then `[defaults]`.
pub fn effective_timeout(global: &GlobalOpts, cfg: &Config, profile: Option<&Profile>) -> u64 {
    global
        .timeout
        .or_else(|| profile.and_then(|p| p.timeout))
        .unwrap_or(cfg.defaults.timeout)
}

/// Build the `SessionConfig` for a command.
///
/// With a matching profile the flags override its values. Without one,
/// `--api-url` is required and the session is anonymous unless a token
/// comes from `--token` or the keyring.
pub fn session_config(global: &GlobalOpts, cfg: &Config) -> Result<SessionConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let profile = cfg.profiles.get(&profile_name);

    let url_str = global
        .api_url
        .as_deref()
        .or_else(|| profile.map(|p| p.api_url.as_str()))
        .filter(|u| !u.is_empty())
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url = parse_api_url(url_str)?;

    let auth = if let Some(ref token) = global.token {
        AuthCredentials::Token(SecretString::from(token.clone()))
    } else if let Some(profile) = profile {
        skillmart_config::resolve_auth(profile, &profile_name)?
    } else {
        // A `login --api-url ...` without a saved profile still keeps its token.
        let bare = Profile::new(url_str);
        skillmart_config::resolve_token(&bare, &profile_name)
            .map_or(AuthCredentials::Anonymous, AuthCredentials::Token)
    };

    let insecure = global.insecure
        || profile
            .and_then(|p| p.insecure)
            .unwrap_or(cfg.defaults.insecure);
    let tls = if insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ca_path) = profile.and_then(|p| p.ca_cert.clone()) {
        TlsVerification::CustomCa(ca_path)
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = SessionConfig::new(url).with_auth(auth);
    config.tls = tls;
    config.timeout = Duration::from_secs(effective_timeout(global, cfg, profile));
    Ok(config)
}
