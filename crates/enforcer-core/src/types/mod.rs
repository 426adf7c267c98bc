//! Shared core types used across the store, engine and commands.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stored snooze count. Signed so that a corrupted negative value read from
/// the store can be detected instead of wrapping.
pub type SnoozeCount = i64;

/// Configured snooze limit. Signed so that non-positive values can be
/// represented and rejected as an inconsistent state.
pub type SnoozeLimit = i64;

/// Hardware serial number identifying the device record in the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceIdentity(String);

impl DeviceIdentity {
    /// Wrap a serial number. Surrounding whitespace is dropped; `None` when
    /// nothing is left.
    pub fn new(serial: impl AsRef<str>) -> Option<Self> {
        let trimmed = serial.as_ref().trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_identity_trims_whitespace() {
        let id = DeviceIdentity::new("  C02XK1ABJGH5\n").unwrap();
        assert_eq!(id.as_str(), "C02XK1ABJGH5");
        assert_eq!(id.to_string(), "C02XK1ABJGH5");
    }

    #[test]
    fn device_identity_rejects_blank() {
        assert!(DeviceIdentity::new("   ").is_none());
        assert!(DeviceIdentity::new("").is_none());
    }
}
