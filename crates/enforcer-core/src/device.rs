//! Device identity discovery.

use std::process::Command;

use crate::error::{EnforcerError, EnforcerResult};
use crate::types::DeviceIdentity;

const IOREG: &str = "/usr/sbin/ioreg";
const SERIAL_KEY: &str = "\"IOPlatformSerialNumber\"";

/// Use the given serial if any, else read it from the I/O registry.
pub fn resolve_device(explicit: Option<&str>) -> EnforcerResult<DeviceIdentity> {
    if let Some(device) = explicit.and_then(DeviceIdentity::new) {
        return Ok(device);
    }
    read_hardware_serial()
}

/// Hardware serial number from `ioreg -c IOPlatformExpertDevice -d 2`.
pub fn read_hardware_serial() -> EnforcerResult<DeviceIdentity> {
    let output = Command::new(IOREG)
        .args(["-c", "IOPlatformExpertDevice", "-d", "2"])
        .output()
        .map_err(|e| EnforcerError::DeviceIdentity(format!("{}: {}", IOREG, e)))?;
    if !output.status.success() {
        return Err(EnforcerError::DeviceIdentity(format!(
            "{} exited with {}",
            IOREG, output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_ioreg_serial(&stdout).ok_or_else(|| {
        EnforcerError::DeviceIdentity("IOPlatformSerialNumber not found".to_string())
    })
}

/// Pull `"IOPlatformSerialNumber" = "XYZ"` out of ioreg output.
pub fn parse_ioreg_serial(output: &str) -> Option<DeviceIdentity> {
    output
        .lines()
        .find(|line| line.contains(SERIAL_KEY))
        .and_then(|line| line.split_once('='))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .and_then(DeviceIdentity::new)
}
