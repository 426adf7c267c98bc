//! Fire-and-forget update policy trigger.

use std::process::{Command, Stdio};

use crate::config::TriggerConfigEntry;

/// Starts the policy that installs updates.
///
/// Triggers are idempotent and report nothing back; the engine never waits
/// on them.
pub trait UpdateTrigger {
    fn fire(&self, policy: &str);
}

/// Runs `jamf policy -event <policy>` in the background.
#[derive(Debug, Clone)]
pub struct JamfPolicyTrigger {
    command: String,
}

impl JamfPolicyTrigger {
    pub fn new(config: &TriggerConfigEntry) -> Self {
        Self {
            command: config.command.clone(),
        }
    }

    pub fn args(policy: &str) -> [&str; 3] {
        ["policy", "-event", policy]
    }
}

impl UpdateTrigger for JamfPolicyTrigger {
    fn fire(&self, policy: &str) {
        let spawned = Command::new(&self.command)
            .args(Self::args(policy))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                tracing::info!(policy, pid = child.id(), "Update policy triggered");
            }
            Err(err) => {
                tracing::error!(policy, command = %self.command, "Failed to trigger update policy: {}", err);
            }
        }
    }
}
