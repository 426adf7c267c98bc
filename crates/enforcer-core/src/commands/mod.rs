//! High-level commands for enforcer operations.
//!
//! Each command wires the real collaborators (HTTP store, softwareupdate,
//! osascript, jamf) from resolved settings. The `*_with` functions take the
//! collaborators as trait objects so frontends and tests can swap them.

pub mod reset;
pub mod run;
pub mod status;

pub use reset::{ResetCommand, ResetReport, reset_with};
pub use run::RunCommand;
pub use status::{StatusCommand, StatusReport, status_with};
