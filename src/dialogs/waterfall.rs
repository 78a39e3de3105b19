//! Waterfall dialogs — an ordered list of named steps.
//!
//! One `Waterfall` definition serves every conversation. Everything that
//! changes while it runs lives in the `DialogInstance` on the stack.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{DialogError, Result};

use super::prompts::PromptOptions;
use super::turn::TurnContext;

/// What a step asks the stack to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum StepResult {
    /// Ask a question and suspend the turn.
    Prompt {
        prompt_id: String,
        options: PromptOptions,
    },
    /// Run the next step now, handing it this value as `result`.
    Next(Value),
    /// Push a child dialog; this waterfall resumes when it ends.
    BeginDialog { dialog_id: String, options: Value },
    /// Pop this dialog, returning a value to the parent.
    EndDialog(Value),
    /// Pop this dialog without resuming the parent, then begin another.
    ReplaceDialog { dialog_id: String, options: Value },
}

impl StepResult {
    pub fn prompt(prompt_id: impl Into<String>, options: PromptOptions) -> Self {
        Self::Prompt {
            prompt_id: prompt_id.into(),
            options,
        }
    }

    pub fn next(value: impl Into<Value>) -> Self {
        Self::Next(value.into())
    }

    pub fn begin(dialog_id: impl Into<String>, options: impl Into<Value>) -> Self {
        Self::BeginDialog {
            dialog_id: dialog_id.into(),
            options: options.into(),
        }
    }

    pub fn end(value: impl Into<Value>) -> Self {
        Self::EndDialog(value.into())
    }

    pub fn replace(dialog_id: impl Into<String>, options: impl Into<Value>) -> Self {
        Self::ReplaceDialog {
            dialog_id: dialog_id.into(),
            options: options.into(),
        }
    }
}

/// Everything a step can see and touch.
pub struct StepContext<'a> {
    pub turn: &'a mut TurnContext,
    /// Value passed when this dialog instance was begun.
    pub options: &'a Value,
    /// Values carried between steps of this instance.
    pub values: &'a mut Map<String, Value>,
    /// Answer from the prompt or child dialog that just completed.
    pub result: Value,
    pub index: usize,
    pub name: &'a str,
}

impl StepContext<'_> {
    /// `result` as a string, if it is one.
    pub fn result_str(&self) -> Option<&str> {
        self.result.as_str()
    }

    pub fn result_bool(&self) -> Option<bool> {
        self.result.as_bool()
    }

    /// The `value` field of a choice-prompt result, or the result itself if it is text.
    pub fn result_choice(&self) -> Option<&str> {
        self.result
            .get("value")
            .and_then(Value::as_str)
            .or_else(|| self.result.as_str())
    }

    /// Read a value stored by an earlier step.
    pub fn value<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let raw = self.values.get(key).ok_or_else(|| DialogError::MissingValue {
            key: key.to_string(),
        })?;
        serde_json::from_value(raw.clone()).map_err(|_| {
            DialogError::InvalidValue {
                key: key.to_string(),
                expected: std::any::type_name::<T>().to_string(),
            }
            .into()
        })
    }

    /// Store a value for later steps.
    pub fn set_value<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        self.values
            .insert(key.to_string(), serde_json::to_value(value)?);
        Ok(())
    }
}

/// A step body. Steps are synchronous; all I/O happens at turn boundaries.
pub type StepFn = Box<dyn Fn(&mut StepContext<'_>) -> Result<StepResult> + Send + Sync>;

struct Step {
    name: String,
    run: StepFn,
}

/// An ordered, named list of steps.
pub struct Waterfall {
    id: String,
    steps: Vec<Step>,
}

impl Waterfall {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    pub fn step<F>(mut self, name: impl Into<String>, run: F) -> Self
    where
        F: Fn(&mut StepContext<'_>) -> Result<StepResult> + Send + Sync + 'static,
    {
        self.steps.push(Step {
            name: name.into(),
            run: Box::new(run),
        });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_name(&self, index: usize) -> Option<&str> {
        self.steps.get(index).map(|s| s.name.as_str())
    }

    /// Run the step at `ctx.index`.
    pub fn run_step(&self, ctx: &mut StepContext<'_>) -> Result<StepResult> {
        let step = self
            .steps
            .get(ctx.index)
            .ok_or_else(|| DialogError::StepOutOfRange {
                dialog_id: self.id.clone(),
                index: ctx.index,
            })?;
        (step.run)(ctx)
    }
}

impl std::fmt::Debug for Waterfall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waterfall")
            .field("id", &self.id)
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
