//! Enforcer Core Library
//!
//! Provides the update-compliance escalation engine: a snooze counter kept in
//! a remote inventory record, a blocking user prompt, and an update trigger
//! that fires once the snooze limit is reached.

pub mod commands;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod session;
pub mod store;
pub mod trigger;
pub mod types;
pub mod updates;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{ConfigStore, EnforcerConfig, RunSettings};

    // Errors
    pub use crate::error::{EnforcerError, StoreError};

    // Engine
    pub use crate::engine::{
        EscalationEngine, EscalationPolicy, EscalationState, PersistOutcome, RunReport,
        classify,
    };

    // Collaborators
    pub use crate::prompt::{ButtonChoice, PromptRequest, PromptSurface, UserDecision};
    pub use crate::store::{ComplianceStore, JamfStore, MemoryStore};
    pub use crate::trigger::{JamfPolicyTrigger, UpdateTrigger};
    pub use crate::updates::{SoftwareUpdateCli, UpdateSource};

    // Types
    pub use crate::types::{DeviceIdentity, SnoozeCount, SnoozeLimit};
}
