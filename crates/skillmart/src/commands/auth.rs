//! Login, registration, logout and whoami.

use std::time::Duration;

use dialoguer::Input;
use secrecy::SecretString;

use skillmart_core::{
    AuthCredentials, CreateUserRequest, Session, SessionConfig, TlsVerification, User, validate,
};

use crate::cli::{GlobalOpts, LoginArgs, RegisterArgs};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

use super::{Backend, users, util};

/// Where a login or registration goes and how to reach it.
struct Target {
    cfg: Config,
    profile_name: String,
    existing: Option<Profile>,
    api_url: String,
    session_config: SessionConfig,
    timeout: u64,
}

impl Target {
    fn resolve(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::load_config_or_default();
        let profile_name = config::active_profile_name(global, &cfg);
        let existing = cfg.profiles.get(&profile_name).cloned();

        let api_url = global
            .api_url
            .clone()
            .or_else(|| existing.as_ref().map(|p| p.api_url.clone()))
            .filter(|u| !u.is_empty())
            .ok_or_else(|| CliError::NoConfig {
                path: config::config_path().display().to_string(),
            })?;

        let mut session_config = SessionConfig::new(config::parse_api_url(&api_url)?);
        if global.insecure || existing.as_ref().and_then(|p| p.insecure).unwrap_or(false) {
            session_config.tls = TlsVerification::DangerAcceptInvalid;
        } else if let Some(ca) = existing.as_ref().and_then(|p| p.ca_cert.clone()) {
            session_config.tls = TlsVerification::CustomCa(ca);
        }
        let timeout = config::effective_timeout(global, &cfg, existing.as_ref());
        session_config.timeout = Duration::from_secs(timeout);

        Ok(Self {
            cfg,
            profile_name,
            existing,
            api_url,
            session_config,
            timeout,
        })
    }

    /// Keep `token` in the keyring and point the profile at it.
    fn save_token(mut self, email: String, token: &SecretString) -> Result<String, CliError> {
        config::store_token(&self.profile_name, token)?;

        let api_url = self.api_url;
        let profile = self
            .cfg
            .profiles
            .entry(self.profile_name.clone())
            .or_insert_with(|| Profile::new(api_url.clone()));
        profile.api_url = api_url;
        profile.auth_mode = "token".into();
        profile.email = Some(email);
        if self.cfg.profiles.len() == 1 {
            self.cfg.default_profile = Some(self.profile_name.clone());
        }
        config::save_config(&self.cfg)?;
        Ok(self.profile_name)
    }
}

fn check_email(email: &str) -> Result<(), CliError> {
    validate::email(email).map_err(|e| CliError::Validation {
        field: e.field.into(),
        reason: e.reason,
    })
}

fn describe(user: &User) -> String {
    format!("{} ({})", user.name, user.profile.role_name())
}

/// Exchange email + password for a token and keep it in the keyring.
///
/// The profile is created (or pointed at `--api-url`) and switched to
/// token auth, so later commands use the stored token.
pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = Target::resolve(global)?;

    let email = match args
        .email
        .or_else(|| target.existing.as_ref().and_then(|p| p.email.clone()))
    {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    check_email(&email)?;

    let password = match std::env::var(skillmart_config::PASSWORD_ENV) {
        Ok(pw) => pw,
        Err(_) => rpassword::prompt_password("Password: ").map_err(util::prompt_err)?,
    };
    if password.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "cannot be empty".into(),
        });
    }

    let session = Session::new(target.session_config.clone().with_auth(
        AuthCredentials::Credentials {
            email: email.clone(),
            password: SecretString::from(password),
        },
    ));
    util::with_spinner(global, "Logging in", session.connect())
        .await
        .map_err(|e| CliError::from(e).in_context(&target.profile_name, target.timeout))?;
    let token = session.issued_token().await;
    let user = session.current_user();
    session.disconnect().await;

    let token = token.ok_or_else(|| CliError::AuthFailed {
        message: "the backend did not issue a token".into(),
        profile: target.profile_name.clone(),
    })?;
    let profile_name = target.save_token(email, &token)?;

    let who = user.map_or_else(|| "unknown user".to_owned(), |u| describe(&u));
    util::notice(
        global,
        &format!("✓ Logged in as {who}. Token stored for profile '{profile_name}'."),
    );
    Ok(())
}

/// Create an account, then keep its token like `login` does.
pub async fn register(args: RegisterArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let target = Target::resolve(global)?;
    check_email(&args.email)?;
    let profile = users::role_profile(args.role, args.education, args.expertise, args.bio)?;
    let request = CreateUserRequest {
        name: args.name,
        email: args.email,
        password: users::prompt_new_password()?,
        profile,
    };

    let (user, token) = util::with_spinner(
        global,
        "Creating account",
        Session::register(&target.session_config, &request),
    )
    .await
    .map_err(|e| CliError::from(e).in_context(&target.profile_name, target.timeout))?;

    let profile_name = target.save_token(request.email, &token)?;
    util::notice(
        global,
        &format!(
            "✓ Registered {}. Token stored for profile '{profile_name}'.",
            describe(&user)
        ),
    );
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    if config::clear_token(&profile_name)? {
        util::notice(global, &format!("✓ Token removed for profile '{profile_name}'"));
    } else {
        util::notice(global, &format!("No stored token for profile '{profile_name}'"));
    }
    Ok(())
}

pub async fn whoami(backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    let session = util::with_spinner(global, "Connecting", backend.session()).await?;
    let user = session
        .current_user()
        .ok_or_else(|| CliError::LoginRequired {
            action: "whoami".into(),
        })?;
    let out = output::render_single(&global.output, &*user, users::user_detail, |u| {
        u.id.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
