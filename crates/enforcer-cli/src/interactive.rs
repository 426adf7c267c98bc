//! Terminal prompt surface.
//!
//! Used with `enforcer run --terminal` to answer prompts on the invoking
//! terminal instead of the console user's screen. Uses dialoguer for the
//! button choice.

use std::cell::RefCell;
use std::io::{self, Write};

use console::{Term, style};
use dialoguer::{Select, theme::ColorfulTheme};

use enforcer_core::error::{EnforcerError, EnforcerResult};
use enforcer_core::prompt::{ButtonChoice, PromptRequest, PromptSurface};

/// Prompt rendered on stderr with a dialoguer selection.
///
/// Prompt timeouts are not supported here; the selection waits for input.
pub struct TerminalPrompt<W: Write = io::Stderr> {
    /// Output writer for the prompt text (for testing)
    writer: RefCell<W>,
    /// Theme for dialoguer prompts
    theme: ColorfulTheme,
}

impl TerminalPrompt<io::Stderr> {
    pub fn new() -> Self {
        Self {
            writer: RefCell::new(io::stderr()),
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt<io::Stderr> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TerminalPrompt<W> {
    /// Create a terminal prompt with a custom writer (for testing).
    #[cfg(test)]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer: RefCell::new(writer),
            theme: ColorfulTheme::default(),
        }
    }

    fn print_request(&self, request: &PromptRequest) -> io::Result<()> {
        let mut writer = self.writer.borrow_mut();
        writeln!(writer)?;
        if request.urgent {
            writeln!(writer, "{}", style(format!("  {}", request.title)).bold().yellow())?;
        } else {
            writeln!(writer, "{}", style(format!("  {}", request.title)).bold().cyan())?;
        }
        writeln!(writer)?;
        for line in request.message.lines() {
            writeln!(writer, "  {}", line)?;
        }
        writeln!(writer)?;
        writer.flush()
    }

    fn select(&self, request: &PromptRequest) -> EnforcerResult<usize> {
        let items = button_labels(request);
        Select::with_theme(&self.theme)
            .with_prompt("Choose")
            .items(&items)
            .default(0)
            .interact_on(&Term::stderr())
            .map_err(|e| EnforcerError::PromptSurface(format!("terminal prompt failed: {}", e)))
    }
}

impl<W: Write> PromptSurface for TerminalPrompt<W> {
    fn prompt(&self, request: &PromptRequest) -> EnforcerResult<ButtonChoice> {
        if !Term::stderr().is_term() {
            return Err(EnforcerError::PromptSurface(
                "--terminal needs an interactive terminal".to_string(),
            ));
        }

        self.print_request(request)
            .map_err(|e| EnforcerError::PromptSurface(format!("terminal write failed: {}", e)))?;
        let selection = self.select(request)?;
        Ok(choice_for(selection))
    }
}

/// Buttons in display order; the primary button comes first.
fn button_labels(request: &PromptRequest) -> Vec<&str> {
    let mut labels = vec![request.primary.as_str()];
    if let Some(secondary) = &request.secondary {
        labels.push(secondary.as_str());
    }
    labels
}

fn choice_for(selection: usize) -> ButtonChoice {
    match selection {
        0 => ButtonChoice::Primary,
        _ => ButtonChoice::Secondary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(request: &PromptRequest) -> String {
        let prompt = TerminalPrompt::with_writer(Vec::new());
        prompt.print_request(request).unwrap();
        let bytes = prompt.writer.into_inner();
        console::strip_ansi_codes(&String::from_utf8(bytes).unwrap()).into_owned()
    }

    #[test]
    fn prints_title_and_message_lines() {
        let request = PromptRequest::snooze_capable(
            "Software Updates",
            "Pending:\n• Security Update".to_string(),
            false,
        );
        let output = rendered(&request);

        assert!(output.contains("  Software Updates"));
        assert!(output.contains("  Pending:\n  • Security Update"));
    }

    #[test]
    fn snooze_prompt_lists_update_first() {
        let request = PromptRequest::snooze_capable("Updates", String::new(), true);
        assert_eq!(button_labels(&request), vec!["UPDATE", "Snooze"]);
        assert_eq!(choice_for(0), ButtonChoice::Primary);
        assert_eq!(choice_for(1), ButtonChoice::Secondary);
    }

    #[test]
    fn notice_has_single_button() {
        let request = PromptRequest::notice("Updates", String::new());
        assert_eq!(button_labels(&request), vec!["OK"]);
    }
}
