//! Remote compliance store holding the per-device snooze counter.
//!
//! The engine only talks to [`ComplianceStore`]. [`JamfStore`] is the HTTP
//! implementation; [`MemoryStore`] backs tests and dry runs.

pub mod jamf;
pub mod xml;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::StoreError;
use crate::types::{DeviceIdentity, SnoozeCount};

pub use jamf::JamfStore;

/// Read/write access to the snooze counter of a device record.
///
/// Writes are last-write-wins; no versioning is expected.
pub trait ComplianceStore {
    /// Read the stored counter for `device`.
    fn fetch(&self, device: &DeviceIdentity) -> Result<SnoozeCount, StoreError>;

    /// Overwrite the stored counter for `device`.
    fn store(&self, device: &DeviceIdentity, count: SnoozeCount) -> Result<(), StoreError>;
}

/// In-memory store with failure injection.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    counts: HashMap<DeviceIdentity, SnoozeCount>,
    writes: Vec<(DeviceIdentity, SnoozeCount)>,
    fetch_error: Option<StoreError>,
    store_error: Option<StoreError>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a counter for one device.
    pub fn with_count(device: &DeviceIdentity, count: SnoozeCount) -> Self {
        let store = Self::new();
        store.state().counts.insert(device.clone(), count);
        store
    }

    /// Make every subsequent fetch fail with `error`.
    pub fn fail_fetch(&self, error: StoreError) {
        self.state().fetch_error = Some(error);
    }

    /// Make every subsequent write fail with `error`.
    pub fn fail_store(&self, error: StoreError) {
        self.state().store_error = Some(error);
    }

    /// Current counter for `device`, bypassing injected failures.
    pub fn count(&self, device: &DeviceIdentity) -> Option<SnoozeCount> {
        self.state().counts.get(device).copied()
    }

    /// Every successful write, in order.
    pub fn writes(&self) -> Vec<(DeviceIdentity, SnoozeCount)> {
        self.state().writes.clone()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ComplianceStore for MemoryStore {
    fn fetch(&self, device: &DeviceIdentity) -> Result<SnoozeCount, StoreError> {
        let state = self.state();
        if let Some(err) = &state.fetch_error {
            return Err(err.clone());
        }
        state
            .counts
            .get(device)
            .copied()
            .ok_or_else(|| StoreError::MalformedCounter { raw: String::new() })
    }

    fn store(&self, device: &DeviceIdentity, count: SnoozeCount) -> Result<(), StoreError> {
        let mut state = self.state();
        if let Some(err) = &state.store_error {
            return Err(err.clone());
        }
        state.counts.insert(device.clone(), count);
        state.writes.push((device.clone(), count));
        Ok(())
    }
}
