//! Blocking user prompt surface.
//!
//! A prompt shows a message with one or two buttons and blocks until the
//! user answers. The raw button result is turned into a [`UserDecision`]
//! before the engine branches on it.

pub mod osascript;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EnforcerResult;

pub use osascript::AppleScriptDialog;

pub const UPDATE_LABEL: &str = "UPDATE";
pub const SNOOZE_LABEL: &str = "Snooze";
pub const ACKNOWLEDGE_LABEL: &str = "OK";

/// Which button closed the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonChoice {
    Primary,
    Secondary,
    /// The prompt gave up waiting for the user.
    TimedOut,
}

/// What the user asked for on a snooze-capable prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserDecision {
    /// Install now
    Proceed,
    /// Snooze
    Defer,
}

impl From<ButtonChoice> for UserDecision {
    fn from(choice: ButtonChoice) -> Self {
        match choice {
            ButtonChoice::Primary => Self::Proceed,
            // An unanswered prompt is a snooze.
            ButtonChoice::Secondary | ButtonChoice::TimedOut => Self::Defer,
        }
    }
}

/// A single prompt to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub title: String,
    pub message: String,
    pub primary: String,
    /// `None` for acknowledgement-only notices
    pub secondary: Option<String>,
    /// Show with a caution icon
    pub urgent: bool,
    pub timeout: Option<Duration>,
}

impl PromptRequest {
    /// "UPDATE" / "Snooze" prompt.
    pub fn snooze_capable(title: &str, message: String, urgent: bool) -> Self {
        Self {
            title: title.to_string(),
            message,
            primary: UPDATE_LABEL.to_string(),
            secondary: Some(SNOOZE_LABEL.to_string()),
            urgent,
            timeout: None,
        }
    }

    /// Informational notice with a single acknowledgement button.
    pub fn notice(title: &str, message: String) -> Self {
        Self {
            title: title.to_string(),
            message,
            primary: ACKNOWLEDGE_LABEL.to_string(),
            secondary: None,
            urgent: true,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_notice(&self) -> bool {
        self.secondary.is_none()
    }
}

/// Blocking two-button prompt.
pub trait PromptSurface {
    /// Show `request` and wait for the user. Fails when the prompt cannot be
    /// shown at all; no answer is ever made up on the user's behalf.
    fn prompt(&self, request: &PromptRequest) -> EnforcerResult<ButtonChoice>;
}
