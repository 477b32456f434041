//! Config subcommand handlers.

use dialoguer::{Input, Select};
use secrecy::{ExposeSecret, SecretString};

use skillmart_core::validate;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, AUTH_MODES, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::util::prompt_err;

const MASK: &str = "****";

// ── Helpers ─────────────────────────────────────────────────────────

/// Copy of the config with plaintext secrets masked, for every output format.
fn redacted(cfg: &Config) -> Config {
    let mut cfg = cfg.clone();
    for profile in cfg.profiles.values_mut() {
        if profile.token.is_some() {
            profile.token = Some(MASK.into());
        }
        if profile.password.is_some() {
            profile.password = Some(MASK.into());
        }
    }
    cfg
}

/// TOML-like view of an already redacted config.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for name in cfg.profile_names() {
        let p = &cfg.profiles[&name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "api_url = \"{}\"", p.api_url);
        let _ = writeln!(out, "auth_mode = \"{}\"", p.auth_mode);
        if let Some(ref token) = p.token {
            let _ = writeln!(out, "token = \"{token}\"");
        }
        if let Some(ref env) = p.token_env {
            let _ = writeln!(out, "token_env = \"{env}\"");
        }
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if let Some(ref password) = p.password {
            let _ = writeln!(out, "password = \"{password}\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out
}

fn profile_not_found(name: String, cfg: &Config) -> CliError {
    let available = cfg.profile_names();
    CliError::ProfileNotFound {
        name,
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

fn prompt_secret(label: &str) -> Result<SecretString, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "secret".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(SecretString::from(secret))
}

/// Ask whether a secret goes to the keyring or the config file.
///
/// Returns `true` for the keyring.
fn prompt_keyring(prompt: &str) -> Result<bool, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(prompt)
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    Ok(selection == 0)
}

/// Apply one `config set` key to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "api_url" | "api-url" => {
            config::parse_api_url(&value)?;
            profile.api_url = value;
        }
        "auth_mode" | "auth-mode" => {
            if !AUTH_MODES.contains(&value.as_str()) {
                return Err(CliError::Validation {
                    field: "auth_mode".into(),
                    reason: format!("must be one of: {}", AUTH_MODES.join(", ")),
                });
            }
            profile.auth_mode = value;
        }
        "token_env" | "token-env" => profile.token_env = Some(value),
        "email" => {
            validate::email(&value).map_err(|e| CliError::Validation {
                field: e.field.into(),
                reason: e.reason,
            })?;
            profile.email = Some(value);
        }
        "insecure" => {
            profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                field: "insecure".into(),
                reason: "must be 'true' or 'false'".into(),
            })?);
        }
        "timeout" => {
            profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                field: "timeout".into(),
                reason: "must be a number (seconds)".into(),
            })?);
        }
        "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: api_url, auth_mode, \
                     token_env, email, insecure, timeout, ca_cert"
                ),
            });
        }
    }
    Ok(())
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("SkillMart CLI configuration");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("API URL")
        .default("http://localhost:5000/api".into())
        .validate_with(|input: &String| {
            config::parse_api_url(input)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let auth_choices = &[
        "Bearer token (recommended)",
        "Email and password",
        "Anonymous (catalog only)",
    ];
    let auth_selection = Select::new()
        .with_prompt("Authentication method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile::new(api_url);
    match auth_selection {
        0 => {
            let token = prompt_secret("Token: ")?;
            if prompt_keyring("Where to store the token?")? {
                config::store_token(&profile_name, &token)?;
                eprintln!("   ✓ Token stored in system keyring");
            } else {
                profile.token = Some(token.expose_secret().to_owned());
            }
            profile.auth_mode = "token".into();
        }
        1 => {
            let email: String = Input::new()
                .with_prompt("Email")
                .interact_text()
                .map_err(prompt_err)?;
            validate::email(&email).map_err(|e| CliError::Validation {
                field: e.field.into(),
                reason: e.reason,
            })?;
            let password = prompt_secret("Password: ")?;
            if prompt_keyring("Where to store the password?")? {
                config::store_password(&profile_name, &password)?;
                eprintln!("   ✓ Password stored in system keyring");
            } else {
                profile.password =
                    Some(password.expose_secret().to_owned());
            }
            profile.email = Some(email);
            profile.auth_mode = "credentials".into();
        }
        _ => profile.auth_mode = "anonymous".into(),
    }

    // Other profiles survive a re-run of the wizard.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    config::save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: skillmart whoami");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                config::config_path().display().to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile::new(String::new()));
            set_key(profile, &key, value)?;
            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: skillmart config init");
            } else {
                for name in cfg.profile_names() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(profile_not_found(name, &cfg));
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            if !cfg.profiles.contains_key(&profile_name) {
                return Err(profile_not_found(profile_name, &cfg));
            }
            let token = prompt_secret("Token: ")?;
            config::store_token(&profile_name, &token)?;
            eprintln!("✓ Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        Profile::new("https://skillmart.example/api")
    }

    #[test]
    fn set_validates_auth_mode() {
        let mut p = profile();
        set_key(&mut p, "auth-mode", "credentials".into()).unwrap();
        assert_eq!(p.auth_mode, "credentials");
        assert!(set_key(&mut p, "auth_mode", "oauth".into()).is_err());
    }

    #[test]
    fn set_parses_typed_values() {
        let mut p = profile();
        set_key(&mut p, "timeout", "45".into()).unwrap();
        set_key(&mut p, "insecure", "true".into()).unwrap();
        assert_eq!(p.timeout, Some(45));
        assert_eq!(p.insecure, Some(true));
        assert!(set_key(&mut p, "timeout", "soon".into()).is_err());
    }

    #[test]
    fn set_rejects_bad_url_and_unknown_keys() {
        let mut p = profile();
        assert!(set_key(&mut p, "api_url", "ftp://example.com".into()).is_err());
        assert!(matches!(
            set_key(&mut p, "site", "x".into()),
            Err(CliError::Validation { ref field, .. }) if field == "site"
        ));
    }

    #[test]
    fn show_masks_plaintext_secrets() {
        let mut cfg = Config::default();
        let mut p = profile();
        p.token = Some("tok-secret".into());
        p.password = Some("hunter22".into());
        cfg.profiles.insert("default".into(), p);

        let shown = format_config(&redacted(&cfg));
        assert!(!shown.contains("tok-secret"));
        assert!(!shown.contains("hunter22"));
        assert!(shown.contains("token = \"****\""));
        assert!(shown.contains("api_url = \"https://skillmart.example/api\""));
    }
}
