//! Read-only status: pending updates, stored counter and derived state.

use serde::{Deserialize, Serialize};

use crate::config::{ApiSettings, UpdaterConfigEntry};
use crate::engine::{EscalationState, classify};
use crate::error::EnforcerResult;
use crate::store::{ComplianceStore, JamfStore};
use crate::types::{DeviceIdentity, SnoozeCount, SnoozeLimit};
use crate::updates::{SoftwareUpdateCli, UpdateSource};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub device: DeviceIdentity,
    pub pending: Vec<String>,
    /// Stored counter, `None` when it could not be read
    pub counter: Option<SnoozeCount>,
    pub counter_error: Option<String>,
    pub snooze_limit: SnoozeLimit,
    /// State the next run would start in (an unreadable counter counts as 0)
    pub state: EscalationState,
}

pub struct StatusCommand {
    api: ApiSettings,
    updater: UpdaterConfigEntry,
    snooze_limit: SnoozeLimit,
}

impl StatusCommand {
    pub fn new(api: ApiSettings, updater: UpdaterConfigEntry, snooze_limit: SnoozeLimit) -> Self {
        Self {
            api,
            updater,
            snooze_limit,
        }
    }

    pub fn execute(&self, device: &DeviceIdentity) -> anyhow::Result<StatusReport> {
        let store = JamfStore::new(self.api.clone())?;
        let updates = SoftwareUpdateCli::new(&self.updater);
        Ok(status_with(&store, &updates, device, self.snooze_limit)?)
    }
}

/// Collect status without prompting, writing or triggering anything.
pub fn status_with(
    store: &dyn ComplianceStore,
    updates: &dyn UpdateSource,
    device: &DeviceIdentity,
    snooze_limit: SnoozeLimit,
) -> EnforcerResult<StatusReport> {
    let pending = updates.list_pending()?;
    let (counter, counter_error) = match store.fetch(device) {
        Ok(count) => (Some(count), None),
        Err(err) => (None, Some(err.to_string())),
    };
    let state = classify(!pending.is_empty(), counter.unwrap_or(0), snooze_limit);

    Ok(StatusReport {
        device: device.clone(),
        pending,
        counter,
        counter_error,
        snooze_limit,
        state,
    })
}
