//! Full escalation run.

use crate::config::RunSettings;
use crate::engine::{EscalationEngine, EscalationPolicy, RunReport};
use crate::prompt::{AppleScriptDialog, PromptSurface};
use crate::store::JamfStore;
use crate::trigger::JamfPolicyTrigger;
use crate::types::DeviceIdentity;
use crate::updates::SoftwareUpdateCli;

pub struct RunCommand {
    settings: RunSettings,
}

impl RunCommand {
    pub fn new(settings: RunSettings) -> Self {
        Self { settings }
    }

    /// Run with the osascript dialog.
    pub fn execute(&self, device: &DeviceIdentity) -> anyhow::Result<RunReport> {
        let dialog = AppleScriptDialog::new(&self.settings.prompt);
        self.execute_with_prompt(device, &dialog)
    }

    /// Run with a caller-supplied prompt surface.
    pub fn execute_with_prompt(
        &self,
        device: &DeviceIdentity,
        prompt: &dyn PromptSurface,
    ) -> anyhow::Result<RunReport> {
        let store = JamfStore::new(self.settings.api.clone())?;
        let updates = SoftwareUpdateCli::new(&self.settings.updater);
        let trigger = JamfPolicyTrigger::new(&self.settings.trigger);

        let engine = EscalationEngine::new(
            &store,
            &updates,
            prompt,
            &trigger,
            EscalationPolicy::from_settings(&self.settings),
        );
        Ok(engine.run(device)?)
    }
}
