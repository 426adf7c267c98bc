//! Error taxonomy for escalation runs.
//!
//! Store failures are recovered inside the engine. Configuration and prompt
//! failures are surfaced to the caller with their own exit codes.

use thiserror::Error;

/// Result type alias for engine operations
pub type EnforcerResult<T> = Result<T, EnforcerError>;

/// Process exit code for a successful run.
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit code for fatal errors without a dedicated code.
pub const EXIT_FAILURE: u8 = 1;
/// Process exit code for an inconsistent escalation state or bad configuration.
pub const EXIT_INCONSISTENT: u8 = 2;
/// Process exit code when the prompt could not be shown.
pub const EXIT_PROMPT_FAILURE: u8 = 3;

/// Failures reported by a [`crate::store::ComplianceStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Endpoint unreachable, timed out, non-success status or unreadable XML.
    #[error("compliance store unavailable: {0}")]
    Unavailable(String),

    /// The record was read but the counter field is missing or not an integer.
    #[error("malformed snooze counter: {raw:?}")]
    MalformedCounter { raw: String },
}

/// Errors that end an escalation run.
#[derive(Debug, Error)]
pub enum EnforcerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Deployment misconfiguration, including an inconsistent escalation state.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The prompt could not be launched or did not return a usable answer.
    #[error("prompt surface failure: {0}")]
    PromptSurface(String),

    /// The OS updater could not be queried for pending updates.
    #[error("failed to query pending updates: {0}")]
    UpdateQuery(String),

    /// The device serial number could not be determined.
    #[error("could not determine device identity: {0}")]
    DeviceIdentity(String),
}

impl EnforcerError {
    /// Exit code the binary reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidConfiguration(_) => EXIT_INCONSISTENT,
            Self::PromptSurface(_) => EXIT_PROMPT_FAILURE,
            Self::Store(_) | Self::UpdateQuery(_) | Self::DeviceIdentity(_) => EXIT_FAILURE,
        }
    }
}
