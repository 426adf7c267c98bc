//! Console user session lookup.
//!
//! Dialogs have to be shown in the session of whoever is logged in at the
//! console, not in the management agent's root context.

use std::process::Command;

use crate::error::{EnforcerError, EnforcerResult};

/// Accounts that own the console when nobody is logged in.
const NON_USER_OWNERS: &[&str] = &["root", "loginwindow", "_mbsetupuser"];

/// The logged-in console user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSession {
    pub user: String,
    pub uid: u32,
}

impl ConsoleSession {
    /// Look up the current console user and their uid.
    pub fn detect() -> EnforcerResult<Self> {
        let owner = run("/usr/bin/stat", &["-f", "%Su", "/dev/console"])?;
        let user = console_user(&owner).ok_or_else(|| {
            EnforcerError::PromptSurface(format!(
                "no user is logged in at the console (owner: '{}')",
                owner.trim()
            ))
        })?;

        let uid_text = run("/usr/bin/id", &["-u", &user])?;
        let uid = uid_text.trim().parse::<u32>().map_err(|_| {
            EnforcerError::PromptSurface(format!("unexpected uid for {}: '{}'", user, uid_text.trim()))
        })?;

        tracing::debug!(%user, uid, "Console session");
        Ok(Self { user, uid })
    }

    /// Prefix that runs a program as this user inside their login session.
    pub fn command_prefix(&self) -> Vec<String> {
        vec![
            "/bin/launchctl".to_string(),
            "asuser".to_string(),
            self.uid.to_string(),
            "/usr/bin/sudo".to_string(),
            "-u".to_string(),
            self.user.clone(),
        ]
    }
}

/// Console owner as a user name, or `None` when nobody is logged in.
pub fn console_user(owner: &str) -> Option<String> {
    let owner = owner.trim();
    if owner.is_empty() || NON_USER_OWNERS.contains(&owner) {
        None
    } else {
        Some(owner.to_string())
    }
}

fn run(program: &str, args: &[&str]) -> EnforcerResult<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| EnforcerError::PromptSurface(format!("{}: {}", program, e)))?;
    if !output.status.success() {
        return Err(EnforcerError::PromptSurface(format!(
            "{} {} exited with {}",
            program,
            args.join(" "),
            output.status
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
