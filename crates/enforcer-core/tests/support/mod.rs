//! Test doubles shared by the integration tests.
#![allow(dead_code)]

pub mod http;

use std::cell::RefCell;
use std::collections::VecDeque;

use enforcer_core::error::{EnforcerError, EnforcerResult};
use enforcer_core::prompt::{ButtonChoice, PromptRequest, PromptSurface};
use enforcer_core::trigger::UpdateTrigger;
use enforcer_core::types::DeviceIdentity;
use enforcer_core::updates::UpdateSource;

pub fn device() -> DeviceIdentity {
    DeviceIdentity::new("C02TEST0001").expect("valid serial")
}

pub fn security_update() -> Vec<String> {
    vec!["Security Update".to_string()]
}

/// Fixed pending update list.
pub struct StaticUpdates {
    pending: Vec<String>,
}

impl StaticUpdates {
    pub fn new(pending: Vec<String>) -> Self {
        Self { pending }
    }

    pub fn none() -> Self {
        Self::new(Vec::new())
    }
}

impl UpdateSource for StaticUpdates {
    fn list_pending(&self) -> EnforcerResult<Vec<String>> {
        Ok(self.pending.clone())
    }
}

/// Updater that cannot be run.
pub struct BrokenUpdates;

impl UpdateSource for BrokenUpdates {
    fn list_pending(&self) -> EnforcerResult<Vec<String>> {
        Err(EnforcerError::UpdateQuery("softwareupdate not found".to_string()))
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Answer {
    Press(ButtonChoice),
    FailToLaunch,
}

/// Prompt that replays scripted answers and records every request.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<Answer>>,
    shown: RefCell<Vec<PromptRequest>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            shown: RefCell::new(Vec::new()),
        }
    }

    /// Prompt that must never be asked anything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn pressing(choice: ButtonChoice) -> Self {
        Self::new([Answer::Press(choice)])
    }

    /// Queue another answer.
    pub fn push(&self, answer: Answer) {
        self.answers.borrow_mut().push_back(answer);
    }

    pub fn shown(&self) -> Vec<PromptRequest> {
        self.shown.borrow().clone()
    }
}

impl PromptSurface for ScriptedPrompt {
    fn prompt(&self, request: &PromptRequest) -> EnforcerResult<ButtonChoice> {
        self.shown.borrow_mut().push(request.clone());
        match self.answers.borrow_mut().pop_front() {
            Some(Answer::Press(choice)) => Ok(choice),
            Some(Answer::FailToLaunch) => Err(EnforcerError::PromptSurface(
                "no console session".to_string(),
            )),
            None => Err(EnforcerError::PromptSurface(format!(
                "unexpected prompt: {}",
                request.message
            ))),
        }
    }
}

/// Trigger that records fired policies.
#[derive(Default)]
pub struct RecordingTrigger {
    fired: RefCell<Vec<String>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> Vec<String> {
        self.fired.borrow().clone()
    }
}

impl UpdateTrigger for RecordingTrigger {
    fn fire(&self, policy: &str) {
        self.fired.borrow_mut().push(policy.to_string());
    }
}
