//! Pending update enumeration through the OS updater.

use std::process::Command;

use crate::config::UpdaterConfigEntry;
use crate::error::{EnforcerError, EnforcerResult};

/// Banner and progress lines printed by `softwareupdate -l`.
pub const NOISE_PHRASES: &[&str] = &[
    "Software Update Tool",
    "Finding available software",
    "Software Update found the following new or updated software",
    "No new software available",
];

/// Source of the updates currently pending on this device.
pub trait UpdateSource {
    /// Names of pending updates, in updater order. Empty means compliant.
    fn list_pending(&self) -> EnforcerResult<Vec<String>>;
}

/// `softwareupdate -l` based enumerator.
#[derive(Debug, Clone)]
pub struct SoftwareUpdateCli {
    command: String,
    extra_noise: Vec<String>,
}

impl SoftwareUpdateCli {
    pub fn new(config: &UpdaterConfigEntry) -> Self {
        Self {
            command: config.command.clone(),
            extra_noise: config.extra_noise.clone(),
        }
    }
}

impl UpdateSource for SoftwareUpdateCli {
    fn list_pending(&self) -> EnforcerResult<Vec<String>> {
        let output = Command::new(&self.command)
            .arg("-l")
            .output()
            .map_err(|e| EnforcerError::UpdateQuery(format!("{}: {}", self.command, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(EnforcerError::UpdateQuery(format!(
                "{} -l exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        // The updater splits its banner between stdout and stderr.
        let combined = format!("{}\n{}", stdout, stderr);
        let pending = parse_pending(&combined, &self.extra_noise);
        tracing::debug!(count = pending.len(), "Pending updates: {:?}", pending);
        Ok(pending)
    }
}

/// Extract one name per update from updater output.
///
/// `* Label: X` and `* X` entries yield `X`. Indented detail lines that
/// follow an entry are skipped. Any other line that is not noise is kept
/// as-is.
pub fn parse_pending(output: &str, extra_noise: &[String]) -> Vec<String> {
    let mut pending = Vec::new();
    for raw in output.lines() {
        let line = raw.trim();
        if line.is_empty() || is_noise(line, extra_noise) {
            continue;
        }

        if let Some(entry) = line.strip_prefix('*') {
            let entry = entry.trim();
            let name = entry.strip_prefix("Label:").map(str::trim).unwrap_or(entry);
            if !name.is_empty() {
                pending.push(name.to_string());
            }
            continue;
        }

        let indented = raw.starts_with(char::is_whitespace);
        if indented || line.starts_with("Title:") {
            continue;
        }
        pending.push(line.to_string());
    }
    pending
}

fn is_noise(line: &str, extra_noise: &[String]) -> bool {
    NOISE_PHRASES.iter().any(|phrase| line.contains(phrase))
        || extra_noise
            .iter()
            .any(|phrase| !phrase.is_empty() && line.contains(phrase.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_label_format() {
        let output = "Software Update Tool\n\
\n\
Finding available software\n\
Software Update found the following new or updated software:\n\
* Label: macOS Sonoma 14.6.1-23G93\n\
\tTitle: macOS Sonoma 14.6.1, Version: 14.6.1, Size: 1520450KiB, Recommended: YES, Action: restart, \n\
* Label: Safari17.6SonomaAuto-17.6\n\
\tTitle: Safari, Version: 17.6, Size: 158912KiB, Recommended: YES, \n";

        assert_eq!(
            parse_pending(output, &[]),
            vec![
                "macOS Sonoma 14.6.1-23G93".to_string(),
                "Safari17.6SonomaAuto-17.6".to_string()
            ]
        );
    }

    #[test]
    fn parses_legacy_format() {
        let output = "Software Update Tool\n\
Copyright 2002-2015 Apple Inc.\n\
\n\
Finding available software\n\
Software Update found the following new or updated software:\n\
   * Security Update 2019-001-10.12.6\n\
\tSecurity Update 2019-001 (10.12.6), 1589120K [recommended] [restart]\n";

        assert_eq!(
            parse_pending(output, &["Copyright".to_string()]),
            vec!["Security Update 2019-001-10.12.6".to_string()]
        );
    }

    #[test]
    fn no_updates_is_empty() {
        let output = "Software Update Tool\n\nFinding available software\nNo new software available.\n";
        assert!(parse_pending(output, &[]).is_empty());
    }

    #[test]
    fn unknown_lines_are_kept() {
        assert_eq!(
            parse_pending("Security Update\n", &[]),
            vec!["Security Update".to_string()]
        );
    }

    #[test]
    fn blank_extra_noise_filters_nothing() {
        assert_eq!(
            parse_pending("Security Update\n", &[String::new()]),
            vec!["Security Update".to_string()]
        );
    }
}
