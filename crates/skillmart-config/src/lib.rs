//! Configuration for the skillmart CLI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `skillmart_core::SessionConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use skillmart_core::{AuthCredentials, SessionConfig, TlsVerification};

/// Service name for every keyring entry this tool writes.
pub const KEYRING_SERVICE: &str = "skillmart";

/// Environment variable consulted for credential-mode passwords.
pub const PASSWORD_ENV: &str = "SKILLMART_PASSWORD";

/// Environment variable consulted for the login email when the profile has none.
pub const EMAIL_ENV: &str = "SKILLMART_EMAIL";

pub const AUTH_MODES: &[&str] = &["token", "credentials", "anonymous"];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile names, sorted, for listings and error help.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API root, e.g. "https://skillmart.example/api".
    pub api_url: String,

    /// "token", "credentials" or "anonymous".
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,

    /// Bearer token (plaintext, prefer keyring or env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Environment variable name holding the bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Login email for credentials mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Password for credentials mode (plaintext, prefer keyring).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Path to a PEM CA certificate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

fn default_auth_mode() -> String {
    "token".into()
}

impl Profile {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            auth_mode: default_auth_mode(),
            token: None,
            token_env: None,
            email: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "skillmart", "skillmart").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("skillmart");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Defaults, then `path` if it exists, then `SKILLMART_*` variables
/// (`SKILLMART_DEFAULT_PROFILE`, `SKILLMART_DEFAULTS__OUTPUT`, ...).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed("SKILLMART_")
                .ignore(&["password", "email"])
                .split("__"),
        );

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file is missing or broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to the canonical path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring ─────────────────────────────────────────────────────────

fn token_key(profile_name: &str) -> String {
    format!("{profile_name}/token")
}

fn password_key(profile_name: &str) -> String {
    format!("{profile_name}/password")
}

fn keyring_get(key: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, key).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

fn keyring_set(key: &str, secret: &SecretString) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, key)?.set_password(secret.expose_secret())?;
    Ok(())
}

/// Save a bearer token under `skillmart/<profile>/token`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_set(&token_key(profile_name), token)?;
    debug!(profile = profile_name, "token stored in keyring");
    Ok(())
}

/// Save a login password under `skillmart/<profile>/password`.
pub fn store_password(profile_name: &str, password: &SecretString) -> Result<(), ConfigError> {
    keyring_set(&password_key(profile_name), password)
}

/// Remove the stored token. Returns `false` when there was none.
pub fn clear_token(profile_name: &str) -> Result<bool, ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &token_key(profile_name))?;
    match entry.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Credential resolution ───────────────────────────────────────────

/// Bearer token: `token_env` variable, then keyring, then plaintext.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            debug!(profile = profile_name, source = "env", "token resolved");
            return Ok(SecretString::from(val));
        }
    }

    if let Some(secret) = keyring_get(&token_key(profile_name)) {
        debug!(profile = profile_name, source = "keyring", "token resolved");
        return Ok(secret);
    }

    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Email + password: `SKILLMART_PASSWORD`, then keyring, then plaintext.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var(EMAIL_ENV).ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok((email, SecretString::from(pw)));
    }

    if let Some(pw) = keyring_get(&password_key(profile_name)) {
        return Ok((email, pw));
    }

    if let Some(ref pw) = profile.password {
        return Ok((email, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthCredentials` from a profile's `auth_mode` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "token" => Ok(AuthCredentials::Token(resolve_token(profile, profile_name)?)),
        "credentials" => {
            let (email, password) = resolve_credentials(profile, profile_name)?;
            Ok(AuthCredentials::Credentials { email, password })
        }
        "anonymous" => Ok(AuthCredentials::Anonymous),
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("expected 'token', 'credentials', or 'anonymous', got '{other}'"),
        }),
    }
}

/// Parse and check an API URL.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("expected an http(s) URL, got '{raw}'"),
        });
    }
    Ok(url)
}

/// Build a `SessionConfig` from a profile, with no flag overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let url = parse_api_url(&profile.api_url)?;
    let auth = resolve_auth(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let mut config = SessionConfig::new(url).with_auth(auth);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn write(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.timeout, 30);
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_fields_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "staging"

[defaults]
output = "json"

[profiles.staging]
api_url = "https://staging.skillmart.test/api"
token = "plain-token"
timeout = 5
"#,
        );
        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("staging"));
        assert_eq!(cfg.defaults.output, "json");
        assert_eq!(cfg.defaults.color, "auto");

        let staging = &cfg.profiles["staging"];
        assert_eq!(staging.auth_mode, "token");
        assert_eq!(staging.timeout, Some(5));
        assert_eq!(cfg.profile_names(), vec!["staging".to_owned()]);
    }

    #[test]
    fn save_creates_parent_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        let mut profile = Profile::new("http://localhost:5000/api");
        profile.auth_mode = "anonymous".into();
        cfg.profiles.insert("local".into(), profile);
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.local]"));
        assert!(!written.contains("token"), "unset secrets are not written");

        let reloaded = load_config_from(&path).unwrap();
        assert_eq!(reloaded.profiles["local"].auth_mode, "anonymous");
    }

    #[test]
    fn anonymous_profile_to_session_config() {
        let mut profile = Profile::new("https://skillmart.test/api");
        profile.auth_mode = "anonymous".into();
        profile.insecure = Some(true);
        profile.timeout = Some(12);

        let config = profile_to_session_config(&profile, "anon", &Defaults::default()).unwrap();
        assert!(config.auth.is_anonymous());
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(12));
        assert_eq!(config.api_url.as_str(), "https://skillmart.test/api");
    }

    #[test]
    fn plaintext_token_is_the_last_resort() {
        let mut profile = Profile::new("https://skillmart.test/api");
        profile.token_env = Some("SKILLMART_TEST_TOKEN_THAT_IS_NEVER_SET".into());
        profile.token = Some("from-file".into());

        let token = resolve_token(&profile, "skillmart-test-plaintext-only").unwrap();
        assert_eq!(token.expose_secret(), "from-file");
    }

    #[test]
    fn credentials_mode_needs_an_email() {
        let mut profile = Profile::new("https://skillmart.test/api");
        profile.auth_mode = "credentials".into();
        profile.password = Some("hunter22".into());
        if std::env::var(EMAIL_ENV).is_ok() {
            return;
        }
        assert!(matches!(
            resolve_auth(&profile, "skillmart-test-no-email"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn rejects_bad_url_and_auth_mode() {
        let profile = Profile::new("not a url");
        assert!(matches!(
            profile_to_session_config(&profile, "x", &Defaults::default()),
            Err(ConfigError::Validation { ref field, .. }) if field == "api_url"
        ));
        assert!(parse_api_url("ftp://skillmart.test").is_err());

        let mut profile = Profile::new("https://skillmart.test/api");
        profile.auth_mode = "oauth".into();
        assert!(matches!(
            resolve_auth(&profile, "x"),
            Err(ConfigError::Validation { ref field, .. }) if field == "auth_mode"
        ));
    }
}
