//! Dialog context — drives the stack for one turn.
//!
//! Control returns to the caller only when the top frame suspends on a prompt,
//! the stack empties, or something fails. Step chains (`Next`, child begin, end
//! and resume) all run synchronously inside the same turn.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DialogError, Result};

use super::prompts::PromptOptions;
use super::registry::DialogSet;
use super::state::{DialogInstance, DialogState, PromptFrame};
use super::turn::TurnContext;
use super::waterfall::{StepContext, StepResult};

/// Where the stack ended up after a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogTurnStatus {
    /// Nothing was active.
    Empty,
    /// The top frame is suspended on a prompt.
    Waiting,
    /// The last dialog ended with this value; the stack is now empty.
    Complete(Value),
}

pub struct DialogContext<'a> {
    dialogs: &'a DialogSet,
    state: &'a mut DialogState,
    turn: &'a mut TurnContext,
}

impl<'a> DialogContext<'a> {
    pub fn new(
        dialogs: &'a DialogSet,
        state: &'a mut DialogState,
        turn: &'a mut TurnContext,
    ) -> Self {
        Self {
            dialogs,
            state,
            turn,
        }
    }

    pub fn state(&self) -> &DialogState {
        self.state
    }

    pub fn turn(&mut self) -> &mut TurnContext {
        self.turn
    }

    /// Begin the root dialog on an idle conversation, otherwise resume the top.
    pub fn run(&mut self, root_id: &str) -> Result<DialogTurnStatus> {
        if self.state.is_empty() {
            self.begin_dialog(root_id, Value::Null)
        } else {
            self.continue_dialog()
        }
    }

    /// Push a fresh frame for `dialog_id` and run its first step.
    pub fn begin_dialog(&mut self, dialog_id: &str, options: Value) -> Result<DialogTurnStatus> {
        self.dialogs.find_waterfall(dialog_id)?;
        info!(dialog_id, depth = self.state.depth() + 1, "Dialog begun");
        self.state.push(DialogInstance::new(dialog_id, options));
        self.run_waterfall(Value::Null)
    }

    /// Resume the top frame with the current activity.
    pub fn continue_dialog(&mut self) -> Result<DialogTurnStatus> {
        let Some(top) = self.state.top() else {
            return Ok(DialogTurnStatus::Empty);
        };
        let Some(frame) = top.prompt.clone() else {
            return self.run_waterfall(Value::Null);
        };

        let dialogs = self.dialogs;
        let prompt = dialogs.find_prompt(&frame.prompt_id)?;
        match prompt.evaluate(self.turn, &frame) {
            Some(value) => {
                let top = self.state.top_mut().ok_or(DialogError::EmptyStack)?;
                top.prompt = None;
                top.step_index += 1;
                self.run_waterfall(value)
            }
            None => {
                let retry = prompt.render(&frame.options, true);
                self.turn.send(retry);
                let top = self.state.top_mut().ok_or(DialogError::EmptyStack)?;
                if let Some(waiting) = top.prompt.as_mut() {
                    waiting.attempt_count += 1;
                    debug!(
                        dialog_id = %top.dialog_id,
                        prompt_id = %waiting.prompt_id,
                        attempt = waiting.attempt_count,
                        "Re-prompting"
                    );
                }
                Ok(DialogTurnStatus::Waiting)
            }
        }
    }

    /// Pop the top frame and resume its parent with `value` as the result.
    pub fn end_dialog(&mut self, value: Value) -> Result<DialogTurnStatus> {
        let ended = self.state.pop().ok_or(DialogError::EmptyStack)?;
        info!(dialog_id = %ended.dialog_id, depth = self.state.depth(), "Dialog ended");

        match self.state.top_mut() {
            Some(parent) => {
                parent.step_index += 1;
                self.run_waterfall(value)
            }
            None => Ok(DialogTurnStatus::Complete(value)),
        }
    }

    /// Pop the top frame without resuming its parent, then begin `dialog_id`.
    pub fn replace_dialog(&mut self, dialog_id: &str, options: Value) -> Result<DialogTurnStatus> {
        self.dialogs.find_waterfall(dialog_id)?;
        if let Some(replaced) = self.state.pop() {
            debug!(from = %replaced.dialog_id, to = dialog_id, "Replacing dialog");
        }
        self.begin_dialog(dialog_id, options)
    }

    /// Run steps of the top waterfall until one suspends, ends or hands off.
    fn run_waterfall(&mut self, result: Value) -> Result<DialogTurnStatus> {
        let mut result = result;
        loop {
            let dialogs = self.dialogs;
            let top = self.state.top_mut().ok_or(DialogError::EmptyStack)?;
            let waterfall = dialogs.find_waterfall(&top.dialog_id)?;
            let index = top.step_index;

            let Some(name) = waterfall.step_name(index) else {
                return self.end_dialog(result);
            };
            debug!(dialog_id = %top.dialog_id, step = name, index, "Running step");

            let mut step = StepContext {
                turn: &mut *self.turn,
                options: &top.options,
                values: &mut top.values,
                result,
                index,
                name,
            };
            let outcome = waterfall.run_step(&mut step)?;

            match outcome {
                StepResult::Next(value) => {
                    top.step_index += 1;
                    result = value;
                }
                StepResult::Prompt { prompt_id, options } => {
                    return self.begin_prompt(prompt_id, options);
                }
                StepResult::BeginDialog { dialog_id, options } => {
                    return self.begin_dialog(&dialog_id, options);
                }
                StepResult::EndDialog(value) => return self.end_dialog(value),
                StepResult::ReplaceDialog { dialog_id, options } => {
                    return self.replace_dialog(&dialog_id, options);
                }
            }
        }
    }

    /// Send the question and park the top frame on the prompt.
    fn begin_prompt(
        &mut self,
        prompt_id: String,
        options: PromptOptions,
    ) -> Result<DialogTurnStatus> {
        let dialogs = self.dialogs;
        let prompt = dialogs.find_prompt(&prompt_id)?;
        self.turn.send(prompt.render(&options, false));

        let top = self.state.top_mut().ok_or(DialogError::EmptyStack)?;
        debug!(dialog_id = %top.dialog_id, prompt_id = %prompt_id, "Waiting on prompt");
        top.prompt = Some(PromptFrame {
            prompt_id,
            options,
            attempt_count: 0,
        });
        Ok(DialogTurnStatus::Waiting)
    }
}
