//! AppleScript `display dialog` prompt run through osascript.

use std::process::Command;

use crate::config::{PromptConfigEntry, PromptMode};
use crate::error::{EnforcerError, EnforcerResult};
use crate::session::ConsoleSession;

use super::{ButtonChoice, PromptRequest, PromptSurface};

const OSASCRIPT: &str = "/usr/bin/osascript";

/// Dialog shown with osascript, optionally inside the console user's session.
#[derive(Debug, Clone)]
pub struct AppleScriptDialog {
    mode: PromptMode,
}

impl AppleScriptDialog {
    pub fn new(config: &PromptConfigEntry) -> Self {
        Self { mode: config.mode }
    }

    fn argv(&self, script: String) -> EnforcerResult<Vec<String>> {
        let mut argv = match self.mode {
            PromptMode::Console => ConsoleSession::detect()?.command_prefix(),
            PromptMode::Current => Vec::new(),
        };
        argv.extend([OSASCRIPT.to_string(), "-e".to_string(), script]);
        Ok(argv)
    }
}

impl PromptSurface for AppleScriptDialog {
    fn prompt(&self, request: &PromptRequest) -> EnforcerResult<ButtonChoice> {
        let argv = self.argv(dialog_script(request))?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| EnforcerError::PromptSurface("empty dialog command".to_string()))?;

        tracing::debug!(title = %request.title, notice = request.is_notice(), "Showing dialog");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| EnforcerError::PromptSurface(format!("{}: {}", program, e)))?;

        if !output.status.success() {
            return Err(EnforcerError::PromptSurface(format!(
                "dialog exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_dialog_result(&String::from_utf8_lossy(&output.stdout), request)
    }
}

/// AppleScript source for `request`. The primary button is rightmost and
/// the default.
pub fn dialog_script(request: &PromptRequest) -> String {
    let buttons = match &request.secondary {
        Some(secondary) => format!("{{{}, {}}}", quote(secondary), quote(&request.primary)),
        None => format!("{{{}}}", quote(&request.primary)),
    };

    let mut script = format!(
        "display dialog {} with title {} buttons {} default button {}",
        quote(&request.message),
        quote(&request.title),
        buttons,
        quote(&request.primary)
    );
    if request.urgent {
        script.push_str(" with icon caution");
    }
    if let Some(timeout) = request.timeout {
        script.push_str(&format!(" giving up after {}", timeout.as_secs().max(1)));
    }
    script
}

/// Map osascript output such as `button returned:UPDATE, gave up:false`.
pub fn parse_dialog_result(stdout: &str, request: &PromptRequest) -> EnforcerResult<ButtonChoice> {
    let stdout = stdout.trim();
    if stdout.contains("gave up:true") {
        return Ok(ButtonChoice::TimedOut);
    }

    let button = stdout
        .split(',')
        .find_map(|field| field.trim().strip_prefix("button returned:"))
        .map(str::trim)
        .ok_or_else(|| {
            EnforcerError::PromptSurface(format!("unexpected dialog output: '{}'", stdout))
        })?;

    if button == request.primary {
        Ok(ButtonChoice::Primary)
    } else if request.secondary.as_deref() == Some(button) {
        Ok(ButtonChoice::Secondary)
    } else {
        Err(EnforcerError::PromptSurface(format!(
            "dialog returned unknown button '{}'",
            button
        )))
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn snooze_request() -> PromptRequest {
        PromptRequest::snooze_capable("Software Updates", "Install now?".into(), false)
    }

    #[test]
    fn snooze_dialog_script() {
        assert_eq!(
            dialog_script(&snooze_request()),
            "display dialog \"Install now?\" with title \"Software Updates\" \
             buttons {\"Snooze\", \"UPDATE\"} default button \"UPDATE\""
        );
    }

    #[test]
    fn notice_script_has_single_button_and_icon() {
        let request = PromptRequest::notice("Software Updates", "Installing".into());
        assert_eq!(
            dialog_script(&request),
            "display dialog \"Installing\" with title \"Software Updates\" \
             buttons {\"OK\"} default button \"OK\" with icon caution"
        );
    }

    #[test]
    fn timeout_adds_giving_up() {
        let request = snooze_request().with_timeout(Some(Duration::from_secs(900)));
        assert!(dialog_script(&request).ends_with(" giving up after 900"));
    }

    #[test]
    fn quotes_are_escaped() {
        let request = PromptRequest::notice("T", "Say \"hi\" \\ bye".into());
        assert!(dialog_script(&request).contains("\"Say \\\"hi\\\" \\\\ bye\""));
    }

    #[test]
    fn parses_buttons() {
        let request = snooze_request();
        assert_eq!(
            parse_dialog_result("button returned:UPDATE\n", &request).unwrap(),
            ButtonChoice::Primary
        );
        assert_eq!(
            parse_dialog_result("button returned:Snooze, gave up:false", &request).unwrap(),
            ButtonChoice::Secondary
        );
        assert_eq!(
            parse_dialog_result("button returned:, gave up:true", &request).unwrap(),
            ButtonChoice::TimedOut
        );
    }

    #[test]
    fn unexpected_output_is_prompt_failure() {
        let request = snooze_request();
        assert!(matches!(
            parse_dialog_result("", &request),
            Err(EnforcerError::PromptSurface(_))
        ));
        assert!(matches!(
            parse_dialog_result("button returned:Later", &request),
            Err(EnforcerError::PromptSurface(_))
        ));
    }
}
