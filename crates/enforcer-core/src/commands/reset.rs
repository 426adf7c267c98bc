//! Manual counter reset.

use serde::{Deserialize, Serialize};

use crate::config::ApiSettings;
use crate::error::EnforcerResult;
use crate::store::{ComplianceStore, JamfStore};
use crate::types::{DeviceIdentity, SnoozeCount};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReport {
    pub device: DeviceIdentity,
    /// Counter before the reset, `None` when it could not be read
    pub previous: Option<SnoozeCount>,
}

pub struct ResetCommand {
    api: ApiSettings,
}

impl ResetCommand {
    pub fn new(api: ApiSettings) -> Self {
        Self { api }
    }

    pub fn execute(&self, device: &DeviceIdentity) -> anyhow::Result<ResetReport> {
        let store = JamfStore::new(self.api.clone())?;
        Ok(reset_with(&store, device)?)
    }
}

/// Write a zero counter. Unlike engine runs, a failed write fails the command.
pub fn reset_with(store: &dyn ComplianceStore, device: &DeviceIdentity) -> EnforcerResult<ResetReport> {
    let previous = store.fetch(device).ok();
    store.store(device, 0)?;
    tracing::info!(%device, ?previous, "Snooze counter reset");
    Ok(ResetReport {
        device: device.clone(),
        previous,
    })
}
