//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(io::Error::other(e)))?;
    Ok(confirmed)
}

/// Run `fut` behind a spinner on stderr when it is a terminal.
pub async fn with_spinner<T, E, F>(global: &GlobalOpts, message: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let bar = (!global.quiet && io::stderr().is_terminal()).then(|| {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message.to_owned());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let result = fut.await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    result
}

/// Status line on stderr, unless `--quiet`.
pub fn notice(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("{message}");
    }
}

/// Parse `--expires`: RFC 3339, or `YYYY-MM-DD` meaning the end of that
/// day in UTC.
pub fn parse_expiry(raw: &str) -> Result<DateTime<Utc>, CliError> {
    skillmart_core::model::parse_expiry(raw).ok_or_else(|| CliError::Validation {
        field: "expires".into(),
        reason: format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got '{raw}'"),
    })
}

/// Map a dialoguer / rpassword failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
