//! Escalation decision engine.
//!
//! One run is one fetch-modify-write cycle:
//! 1. Enumerate pending updates
//! 2. Fetch the stored snooze counter (failures read as 0)
//! 3. Derive the [`EscalationState`]
//! 4. Prompt, persist and trigger as the state requires
//!
//! The engine holds no state between runs. Store write failures are logged
//! and never undo a decision that has already been made.

pub mod messages;
pub mod state;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::RunSettings;
use crate::error::{EnforcerError, EnforcerResult};
use crate::prompt::{PromptRequest, PromptSurface, UserDecision};
use crate::store::ComplianceStore;
use crate::trigger::UpdateTrigger;
use crate::types::{DeviceIdentity, SnoozeCount, SnoozeLimit};
use crate::updates::UpdateSource;

pub use state::{EscalationState, classify};

/// Per-run escalation parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EscalationPolicy {
    pub snooze_limit: SnoozeLimit,
    /// Policy fired to install updates
    pub policy: String,
    pub title: String,
    /// Give up on the snooze prompt after this long
    pub prompt_timeout: Option<Duration>,
}

impl EscalationPolicy {
    pub fn new(snooze_limit: SnoozeLimit, policy: impl Into<String>) -> Self {
        Self {
            snooze_limit,
            policy: policy.into(),
            title: "Software Updates".to_string(),
            prompt_timeout: None,
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self {
            snooze_limit: settings.escalation.snooze_limit,
            policy: settings.escalation.policy.clone(),
            title: settings.prompt.title.clone(),
            prompt_timeout: settings.prompt.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// What happened to the counter write of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistOutcome {
    Written,
    Failed,
    /// The run had nothing to write
    Skipped,
}

/// Result of one escalation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub device: DeviceIdentity,
    pub state: EscalationState,
    pub pending: Vec<String>,
    pub snooze_limit: SnoozeLimit,
    /// Counter the decision was based on
    pub counter_before: SnoozeCount,
    /// True when the stored counter could not be read and 0 was used
    pub counter_defaulted: bool,
    /// Counter the device should carry after the run
    pub counter_after: SnoozeCount,
    pub decision: Option<UserDecision>,
    pub triggered: bool,
    pub persisted: PersistOutcome,
}

/// Drives one escalation cycle against injected collaborators.
pub struct EscalationEngine<'a> {
    store: &'a dyn ComplianceStore,
    updates: &'a dyn UpdateSource,
    prompt: &'a dyn PromptSurface,
    trigger: &'a dyn UpdateTrigger,
    policy: EscalationPolicy,
}

impl<'a> EscalationEngine<'a> {
    pub fn new(
        store: &'a dyn ComplianceStore,
        updates: &'a dyn UpdateSource,
        prompt: &'a dyn PromptSurface,
        trigger: &'a dyn UpdateTrigger,
        policy: EscalationPolicy,
    ) -> Self {
        Self {
            store,
            updates,
            prompt,
            trigger,
            policy,
        }
    }

    /// Run one escalation cycle for `device`.
    ///
    /// Fails with [`EnforcerError::InvalidConfiguration`] for an inconsistent
    /// state and [`EnforcerError::PromptSurface`] when a prompt cannot be
    /// shown. Store failures never fail the run.
    pub fn run(&self, device: &DeviceIdentity) -> EnforcerResult<RunReport> {
        let limit = self.policy.snooze_limit;
        if limit <= 0 {
            tracing::error!(limit, "Snooze limit must be positive");
            return Err(EnforcerError::InvalidConfiguration(format!(
                "snooze limit must be a positive integer, got {}",
                limit
            )));
        }

        let pending = self.updates.list_pending()?;
        let (counter, counter_defaulted) = match self.store.fetch(device) {
            Ok(count) => (count, false),
            Err(err) => {
                tracing::warn!(%device, "Could not read snooze counter, using 0: {}", err);
                (0, true)
            }
        };

        let state = classify(!pending.is_empty(), counter, limit);
        tracing::info!(
            %device,
            %state,
            counter,
            limit,
            pending = pending.len(),
            "Escalation state"
        );

        let mut report = RunReport {
            device: device.clone(),
            state,
            pending,
            snooze_limit: limit,
            counter_before: counter,
            counter_defaulted,
            counter_after: counter,
            decision: None,
            triggered: false,
            persisted: PersistOutcome::Skipped,
        };

        match state {
            EscalationState::Compliant => {
                report.counter_after = 0;
                report.persisted = self.persist(device, 0);
            }
            EscalationState::SnoozeEligible | EscalationState::FinalWarning => {
                self.offer_snooze(device, &mut report)?;
            }
            EscalationState::Force => {
                self.force(device, &mut report)?;
            }
            EscalationState::Inconsistent => {
                tracing::error!(%device, counter, limit, "Inconsistent escalation state");
                return Err(EnforcerError::InvalidConfiguration(format!(
                    "snooze counter {} is inconsistent with limit {}",
                    counter, limit
                )));
            }
        }

        Ok(report)
    }

    fn offer_snooze(&self, device: &DeviceIdentity, report: &mut RunReport) -> EnforcerResult<()> {
        let limit = self.policy.snooze_limit;
        let counter = report.counter_before;
        let (message, urgent) = if report.state == EscalationState::FinalWarning {
            (messages::final_warning_message(&report.pending, counter, limit), true)
        } else {
            (messages::snooze_message(&report.pending, counter, limit), false)
        };

        let request = PromptRequest::snooze_capable(&self.policy.title, message, urgent)
            .with_timeout(self.policy.prompt_timeout);
        let decision = UserDecision::from(self.prompt.prompt(&request)?);
        report.decision = Some(decision);

        match decision {
            UserDecision::Proceed => {
                tracing::info!(%device, policy = %self.policy.policy, "User chose to update now");
                self.trigger.fire(&self.policy.policy);
                report.triggered = true;
            }
            UserDecision::Defer => {
                let next = counter.saturating_add(1);
                tracing::info!(%device, next, limit, "User snoozed updates");
                report.counter_after = next;
                report.persisted = self.persist(device, next);
            }
        }
        Ok(())
    }

    fn force(&self, device: &DeviceIdentity, report: &mut RunReport) -> EnforcerResult<()> {
        // Reset before triggering so a failed trigger cannot pin the counter.
        report.counter_after = 0;
        report.persisted = self.persist(device, 0);

        tracing::info!(%device, policy = %self.policy.policy, "Snooze limit reached, forcing updates");
        self.trigger.fire(&self.policy.policy);
        report.triggered = true;

        let notice = PromptRequest::notice(
            &self.policy.title,
            messages::forced_notice_message(&report.pending, self.policy.snooze_limit),
        );
        if let Err(err) = self.prompt.prompt(&notice) {
            tracing::error!(%device, "Updates were triggered but the notice could not be shown");
            return Err(err);
        }
        Ok(())
    }

    fn persist(&self, device: &DeviceIdentity, count: SnoozeCount) -> PersistOutcome {
        match self.store.store(device, count) {
            Ok(()) => {
                tracing::debug!(%device, count, "Snooze counter stored");
                PersistOutcome::Written
            }
            Err(err) => {
                tracing::warn!(%device, count, "Could not store snooze counter: {}", err);
                PersistOutcome::Failed
            }
        }
    }
}
