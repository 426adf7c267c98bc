//! TOML parser with helpful error messages

use super::schema::EnforcerConfig;
use crate::error::EnforcerError;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse enforcer.toml with detailed error messages
///
/// A file that cannot be read is a plain I/O error. Content that does not
/// parse or validate is [`EnforcerError::InvalidConfiguration`].
pub fn parse_enforcer_toml(path: &Path) -> Result<EnforcerConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_enforcer_toml_str(&content).map_err(|e| {
        anyhow::Error::new(EnforcerError::InvalidConfiguration(format!("{:#}", e)))
            .context(format!("Failed to parse config file: {}", path.display()))
    })
}

/// Parse enforcer.toml content from string
pub fn parse_enforcer_toml_str(content: &str) -> Result<EnforcerConfig> {
    let config: EnforcerConfig =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    config.validate()?;

    Ok(config)
}

/// Attach the offending lines to a TOML parsing error
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.message().to_string();

    let line_hint = error
        .span()
        .map(|span| content[..span.start.min(content.len())].matches('\n').count() + 1);

    match line_hint {
        Some(line_num) => {
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                error_msg
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", error_msg),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2).min(lines.len());
    let end = (line_num + 1).min(lines.len());

    lines[start..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
