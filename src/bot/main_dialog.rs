//! Root dialog: greet, route a free-text command, loop.

use serde_json::Value;
use tracing::debug;

use crate::channels::{InputHint, OutgoingActivity};
use crate::dialogs::{PromptOptions, StepContext, StepResult, Waterfall};
use crate::error::Result;

use super::cards;
use super::dialog_ids::{
    MAIN_DIALOG, TEXT_PROMPT, USER_PROFILE_DIALOG, USER_PROFILE_TASK_DIALOG,
};

pub const DEFAULT_GREETING: &str = "What can I help you with today?\nSay something like \"get profile\" or \"get profile2\" or \"test\"";
pub const FOLLOW_UP: &str = "What else can I do for you?";

/// What a recognized command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    BeginDialog(&'static str),
    ShowTaskModules,
}

/// Exact-match command table, compared against lowercased input.
const COMMANDS: &[(&str, Command)] = &[
    ("get profile", Command::BeginDialog(USER_PROFILE_DIALOG)),
    ("get profile2", Command::BeginDialog(USER_PROFILE_TASK_DIALOG)),
    ("test", Command::ShowTaskModules),
];

/// Look up a command. Unknown input is `None` and falls through silently.
pub fn parse_command(text: &str) -> Option<Command> {
    let lower = text.trim().to_lowercase();
    COMMANDS
        .iter()
        .find(|(phrase, _)| *phrase == lower)
        .map(|(_, command)| *command)
}

pub fn main_dialog() -> Waterfall {
    Waterfall::new(MAIN_DIALOG)
        .step("intro", intro_step)
        .step("act", act_step)
        .step("final", final_step)
}

fn intro_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let text = step.options.as_str().unwrap_or(DEFAULT_GREETING);
    let prompt = OutgoingActivity::text(text)
        .with_speak(text)
        .with_input_hint(InputHint::ExpectingInput);
    Ok(StepResult::prompt(TEXT_PROMPT, PromptOptions::activity(prompt)))
}

fn act_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    match parse_command(step.turn.activity().text()) {
        Some(Command::BeginDialog(dialog_id)) => Ok(StepResult::begin(dialog_id, Value::Null)),
        Some(Command::ShowTaskModules) => {
            step.turn
                .send(OutgoingActivity::attachment(cards::task_module_hero_card()));
            Ok(StepResult::next(Value::Null))
        }
        None => {
            debug!(text = step.turn.activity().text(), "No command matched");
            Ok(StepResult::next(Value::Null))
        }
    }
}

fn final_step(_step: &mut StepContext<'_>) -> Result<StepResult> {
    Ok(StepResult::replace(MAIN_DIALOG, FOLLOW_UP))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_match_case_insensitively() {
        assert_eq!(
            parse_command("Get Profile"),
            Some(Command::BeginDialog(USER_PROFILE_DIALOG))
        );
        assert_eq!(
            parse_command("get profile2"),
            Some(Command::BeginDialog(USER_PROFILE_TASK_DIALOG))
        );
        assert_eq!(parse_command("TEST"), Some(Command::ShowTaskModules));
    }

    #[test]
    fn partial_or_unknown_input_falls_through() {
        assert_eq!(parse_command("get"), None);
        assert_eq!(parse_command("get profile please"), None);
        assert_eq!(parse_command(""), None);
    }

    #[test]
    fn router_has_three_steps() {
        let dialog = main_dialog();
        assert_eq!(dialog.len(), 3);
        assert_eq!(dialog.step_name(0), Some("intro"));
        assert_eq!(dialog.step_name(2), Some("final"));
    }
}
