//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod config_cmd;
pub mod coupons;
pub mod courses;
pub mod recommend;
pub mod users;
pub mod util;

use chrono::Utc;
use tokio::sync::OnceCell;

use skillmart_core::{Command as CoreCommand, CommandResult, Session, SessionConfig};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

// ── Backend ─────────────────────────────────────────────────────────

/// Lazily connected session for one invocation.
///
/// Handlers validate their input first and only then ask for the
/// session, so bad input never reaches the network.
pub struct Backend {
    config: SessionConfig,
    session: OnceCell<Session>,
}

impl Backend {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            session: OnceCell::new(),
        }
    }

    pub async fn session(&self) -> Result<&Session, CliError> {
        self.session
            .get_or_try_init(|| async {
                let session = Session::new(self.config.clone());
                session.connect().await?;
                Ok::<_, CliError>(session)
            })
            .await
    }

    /// Validate, connect if needed, then run the command.
    pub async fn execute(&self, cmd: CoreCommand) -> Result<CommandResult, CliError> {
        cmd.validate(Utc::now())?;
        Ok(self.session().await?.execute(cmd).await?)
    }

    pub async fn close(&self) {
        if let Some(session) = self.session.get() {
            session.disconnect().await;
        }
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, backend: &Backend, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Whoami => auth::whoami(backend, global).await,
        Command::Courses(args) => courses::handle(backend, args, global).await,
        Command::Enrollments => courses::enrollments(backend, global).await,
        Command::Cart(args) => cart::handle(backend, args, global).await,
        Command::Coupons(args) => coupons::handle(backend, args, global).await,
        Command::Users(args) => users::handle(backend, args, global).await,
        Command::Admin(args) => admin::handle(backend, args, global).await,
        Command::Recommend(args) => recommend::handle(backend, args, global).await,
        Command::Login(_)
        | Command::Register(_)
        | Command::Logout
        | Command::Config(_)
        | Command::Completions(_) => {
            Err(CliError::Config {
                message: "command does not use a backend session".into(),
            })
        }
    }
}
