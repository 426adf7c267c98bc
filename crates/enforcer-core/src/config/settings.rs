//! Resolution of file configuration and positional parameters into the
//! settings a run actually uses.

use std::time::Duration;

use url::Url;

use crate::error::{EnforcerError, EnforcerResult};
use crate::types::SnoozeLimit;

use super::schema::{
    AttributeConfigEntry, EnforcerConfig, PromptConfigEntry, TriggerConfigEntry,
    UpdaterConfigEntry,
};

/// Positional parameters supplied by the management agent.
///
/// Agents pass unset parameters as empty strings, so blank values are
/// treated the same as absent ones.
#[derive(Debug, Clone, Default)]
pub struct ParameterOverrides {
    pub api_username: Option<String>,
    pub api_password: Option<String>,
    pub api_url: Option<String>,
    pub snooze_limit: Option<String>,
    pub policy: Option<String>,
}

/// Connection settings for the remote compliance store
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub username: String,
    pub password: String,
    pub timeout: Duration,
    pub retries: u32,
    pub attribute: AttributeConfigEntry,
}

/// Snooze limit and policy for an escalation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationSettings {
    pub snooze_limit: SnoozeLimit,
    pub policy: String,
}

/// Everything a full escalation run needs
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub api: ApiSettings,
    pub escalation: EscalationSettings,
    pub prompt: PromptConfigEntry,
    pub updater: UpdaterConfigEntry,
    pub trigger: TriggerConfigEntry,
}

impl RunSettings {
    pub fn resolve(
        config: &EnforcerConfig,
        overrides: &ParameterOverrides,
    ) -> EnforcerResult<Self> {
        Ok(Self {
            api: ApiSettings::resolve(config, overrides)?,
            escalation: EscalationSettings::resolve(config, overrides)?,
            prompt: config.prompt.clone(),
            updater: config.updater.clone(),
            trigger: config.trigger.clone(),
        })
    }
}

impl ApiSettings {
    pub fn resolve(
        config: &EnforcerConfig,
        overrides: &ParameterOverrides,
    ) -> EnforcerResult<Self> {
        let url = pick(&overrides.api_url, &config.api.url)
            .ok_or_else(|| missing("API base URL", "[api] url"))?;
        let base_url = parse_base_url(&url)?;
        let username = pick(&overrides.api_username, &config.api.username)
            .ok_or_else(|| missing("API username", "[api] username"))?;
        let password = pick(&overrides.api_password, &config.api.password)
            .ok_or_else(|| missing("API password", "[api] password"))?;

        Ok(Self {
            base_url,
            username,
            password,
            timeout: Duration::from_secs(config.api.timeout_secs),
            retries: config.api.retries,
            attribute: config.attribute.clone(),
        })
    }
}

impl EscalationSettings {
    pub fn resolve(
        config: &EnforcerConfig,
        overrides: &ParameterOverrides,
    ) -> EnforcerResult<Self> {
        Ok(Self {
            snooze_limit: resolve_limit(config, overrides)?,
            policy: pick(&overrides.policy, &config.escalation.policy)
                .ok_or_else(|| missing("update policy name", "[escalation] policy"))?,
        })
    }
}

/// Resolve the snooze limit alone; `status` needs it without a policy.
///
/// Non-positive values are accepted here and rejected by the engine as an
/// inconsistent state. Only text that is not an integer fails.
pub fn resolve_limit(
    config: &EnforcerConfig,
    overrides: &ParameterOverrides,
) -> EnforcerResult<SnoozeLimit> {
    match non_blank(&overrides.snooze_limit) {
        Some(raw) => raw.parse::<SnoozeLimit>().map_err(|_| {
            EnforcerError::InvalidConfiguration(format!(
                "snooze limit must be an integer, got '{}'",
                raw
            ))
        }),
        None => config
            .escalation
            .snooze_limit
            .ok_or_else(|| missing("snooze limit", "[escalation] snooze_limit")),
    }
}

/// Parse and check an API base URL. Only http and https are accepted.
pub fn parse_base_url(raw: &str) -> EnforcerResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| {
        EnforcerError::InvalidConfiguration(format!("invalid API URL '{}': {}", raw, e))
    })?;
    match url.scheme() {
        "http" | "https" if !url.cannot_be_a_base() => Ok(url),
        other => Err(EnforcerError::InvalidConfiguration(format!(
            "unsupported API URL scheme '{}' in '{}'",
            other, raw
        ))),
    }
}

fn pick(first: &Option<String>, fallback: &Option<String>) -> Option<String> {
    non_blank(first)
        .or_else(|| non_blank(fallback))
        .map(str::to_string)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn missing(what: &str, key: &str) -> EnforcerError {
    EnforcerError::InvalidConfiguration(format!(
        "missing {}: pass it as a parameter or set {} in the config file",
        what, key
    ))
}
