//! Escalation state derived from the pending set, counter and limit.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{SnoozeCount, SnoozeLimit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscalationState {
    /// No updates pending
    Compliant,
    /// Updates pending, counter < limit - 1
    SnoozeEligible,
    /// Updates pending, counter == limit - 1
    FinalWarning,
    /// Updates pending, counter >= limit
    Force,
    /// Non-positive limit or negative counter
    Inconsistent,
}

impl fmt::Display for EscalationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compliant => write!(f, "COMPLIANT"),
            Self::SnoozeEligible => write!(f, "SNOOZE_ELIGIBLE"),
            Self::FinalWarning => write!(f, "FINAL_WARNING"),
            Self::Force => write!(f, "FORCE"),
            Self::Inconsistent => write!(f, "INCONSISTENT"),
        }
    }
}

/// Derive the escalation state.
///
/// A non-positive limit is inconsistent whatever else is true. With a valid
/// limit, an empty pending set is compliant regardless of the counter.
pub fn classify(has_pending: bool, counter: SnoozeCount, limit: SnoozeLimit) -> EscalationState {
    if limit <= 0 {
        return EscalationState::Inconsistent;
    }
    if !has_pending {
        return EscalationState::Compliant;
    }
    if counter < 0 {
        return EscalationState::Inconsistent;
    }

    let final_snooze = limit - 1;
    if counter < final_snooze {
        EscalationState::SnoozeEligible
    } else if counter == final_snooze {
        EscalationState::FinalWarning
    } else {
        EscalationState::Force
    }
}
