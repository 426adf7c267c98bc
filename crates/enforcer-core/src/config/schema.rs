//! Configuration schema for enforcer.toml
//!
//! Every section is optional. Values given as positional parameters on the
//! command line take precedence over the file (see [`super::settings`]).

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Root configuration structure for enforcer.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EnforcerConfig {
    /// Remote inventory API connection
    #[serde(default)]
    pub api: ApiConfigEntry,

    /// Extension attribute holding the snooze counter
    #[serde(default)]
    pub attribute: AttributeConfigEntry,

    /// Snooze limit and update policy
    #[serde(default)]
    pub escalation: EscalationConfigEntry,

    /// User prompt presentation
    #[serde(default)]
    pub prompt: PromptConfigEntry,

    /// OS updater used to enumerate pending updates
    #[serde(default)]
    pub updater: UpdaterConfigEntry,

    /// Management agent used to fire the update policy
    #[serde(default)]
    pub trigger: TriggerConfigEntry,
}

/// Remote inventory API connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfigEntry {
    /// Base URL, e.g. "https://company.jamfcloud.com"
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a timeout or connection failure
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ApiConfigEntry {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
            retries: default_retries(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retries() -> u32 {
    3
}

/// Extension attribute holding the snooze counter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributeConfigEntry {
    #[serde(default = "default_attribute_name")]
    pub name: String,

    #[serde(default = "default_attribute_id")]
    pub id: u32,
}

impl Default for AttributeConfigEntry {
    fn default() -> Self {
        Self {
            name: default_attribute_name(),
            id: default_attribute_id(),
        }
    }
}

fn default_attribute_name() -> String {
    "OS Update Snoozes".to_string()
}

fn default_attribute_id() -> u32 {
    13
}

/// Snooze limit and update policy
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct EscalationConfigEntry {
    /// Number of snoozes allowed before the install is forced
    #[serde(default)]
    pub snooze_limit: Option<i64>,

    /// Custom trigger name of the policy that installs updates
    #[serde(default)]
    pub policy: Option<String>,
}

/// Which session the prompt is shown in
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Logged-in console user, reached through `launchctl asuser`
    #[default]
    Console,
    /// The account running enforcer
    Current,
}

/// User prompt presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptConfigEntry {
    #[serde(default = "default_prompt_title")]
    pub title: String,

    #[serde(default)]
    pub mode: PromptMode,

    /// Give up on the snooze prompt after this many seconds (counts as a snooze)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for PromptConfigEntry {
    fn default() -> Self {
        Self {
            title: default_prompt_title(),
            mode: PromptMode::default(),
            timeout_secs: None,
        }
    }
}

fn default_prompt_title() -> String {
    "Software Updates".to_string()
}

/// OS updater used to enumerate pending updates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdaterConfigEntry {
    #[serde(default = "default_updater_command")]
    pub command: String,

    /// Phrases filtered out in addition to the built-in banner lines
    #[serde(default)]
    pub extra_noise: Vec<String>,
}

impl Default for UpdaterConfigEntry {
    fn default() -> Self {
        Self {
            command: default_updater_command(),
            extra_noise: Vec::new(),
        }
    }
}

fn default_updater_command() -> String {
    "/usr/sbin/softwareupdate".to_string()
}

/// Management agent used to fire the update policy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerConfigEntry {
    #[serde(default = "default_trigger_command")]
    pub command: String,
}

impl Default for TriggerConfigEntry {
    fn default() -> Self {
        Self {
            command: default_trigger_command(),
        }
    }
}

fn default_trigger_command() -> String {
    "/usr/local/bin/jamf".to_string()
}

impl EnforcerConfig {
    /// Create an empty configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if let Some(url) = &self.api.url {
            super::settings::parse_base_url(url)
                .with_context(|| format!("Invalid [api] url: '{}'", url))?;
        }

        if self.api.timeout_secs == 0 {
            anyhow::bail!("[api] timeout_secs must be greater than zero");
        }

        if self.attribute.name.trim().is_empty() {
            anyhow::bail!("[attribute] name must not be empty");
        }

        if let Some(policy) = &self.escalation.policy
            && policy.trim().is_empty()
        {
            anyhow::bail!("[escalation] policy must not be empty");
        }

        if self.prompt.timeout_secs == Some(0) {
            anyhow::bail!("[prompt] timeout_secs must be greater than zero");
        }

        if self.updater.command.trim().is_empty() {
            anyhow::bail!("[updater] command must not be empty");
        }

        if self.trigger.command.trim().is_empty() {
            anyhow::bail!("[trigger] command must not be empty");
        }

        Ok(())
    }
}
