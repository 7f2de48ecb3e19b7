//! Terminal prompts for the admin PIN and removal confirmations.
//!
//! Prompts go to stderr so stdout stays clean for `--json` output.

use std::io::{BufRead, Write};
use taskboard_core::{AdminAction, ConfirmationRequest, Decision, PinPrompt, StaticPin};

/// PIN source for the admin gate.
pub enum CliPinPrompt {
    /// `--pin` or `TASKBOARD_PIN`.
    Fixed(StaticPin),
    /// Ask on the terminal for each gated action.
    Interactive,
}

impl CliPinPrompt {
    pub fn from_arg(pin: Option<String>) -> Self {
        match pin {
            Some(pin) => Self::Fixed(StaticPin(pin)),
            None => Self::Interactive,
        }
    }
}

impl PinPrompt for CliPinPrompt {
    fn request_pin(&self, action: AdminAction) -> Option<String> {
        match self {
            Self::Fixed(pin) => pin.request_pin(action),
            Self::Interactive => ask(&format!("Admin PIN required for {action}: ")),
        }
    }
}

/// Asks the y/N question for `request`; end of input cancels.
pub fn confirm(request: &ConfirmationRequest) -> Decision {
    match ask(&format!("{} [y/N] ", request.message())) {
        Some(answer) => Decision::from_answer(&answer),
        None => Decision::Cancel,
    }
}

fn ask(question: &str) -> Option<String> {
    let mut stderr = std::io::stderr();
    write!(stderr, "{question}").ok()?;
    stderr.flush().ok()?;
    read_answer(&mut std::io::stdin().lock())
}

/// Reads one line; `None` at end of input or on a read error.
fn read_answer(input: &mut impl BufRead) -> Option<String> {
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::{read_answer, CliPinPrompt};
    use taskboard_core::{AdminAction, PinPrompt};

    #[test]
    fn read_answer_strips_line_ending() {
        let mut input = "1234\r\nignored\n".as_bytes();
        assert_eq!(read_answer(&mut input).as_deref(), Some("1234"));
    }

    #[test]
    fn read_answer_reports_end_of_input() {
        let mut input = "".as_bytes();
        assert!(read_answer(&mut input).is_none());
    }

    #[test]
    fn fixed_pin_is_returned_for_every_action() {
        let prompt = CliPinPrompt::from_arg(Some("9876".to_string()));
        assert_eq!(
            prompt.request_pin(AdminAction::RemoveTask).as_deref(),
            Some("9876")
        );
    }
}
