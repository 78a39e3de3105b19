//! Persisted dialog stack.
//!
//! The whole stack is plain data: which dialog is active at each level, which
//! step it is on, its accumulated values, and (for the top frame) which prompt
//! it is waiting on. Nothing else survives between turns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::prompts::PromptOptions;

/// Conversation-state property the stack is stored under.
pub const DIALOG_STATE_PROPERTY: &str = "DialogState";

/// A prompt the top frame is suspended on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptFrame {
    /// Registry id of the prompt; also selects its recognizer and validator.
    pub prompt_id: String,
    pub options: PromptOptions,
    /// Number of rejected answers so far.
    #[serde(default)]
    pub attempt_count: u32,
}

/// One active dialog on the stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogInstance {
    pub dialog_id: String,
    pub step_index: usize,
    /// Value passed when the dialog was begun.
    #[serde(default)]
    pub options: Value,
    /// Values carried between steps of this instance.
    #[serde(default)]
    pub values: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<PromptFrame>,
}

impl DialogInstance {
    /// A fresh frame at step 0 with no values.
    pub fn new(dialog_id: impl Into<String>, options: Value) -> Self {
        Self {
            dialog_id: dialog_id.into(),
            step_index: 0,
            options,
            values: Map::new(),
            prompt: None,
        }
    }

    /// Whether this frame is suspended on a prompt.
    pub fn is_waiting(&self) -> bool {
        self.prompt.is_some()
    }
}

/// The dialog stack for one conversation. Top = last element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogState {
    #[serde(default)]
    pub stack: Vec<DialogInstance>,
}

impl DialogState {
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// An empty stack means the conversation is idle.
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn top(&self) -> Option<&DialogInstance> {
        self.stack.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut DialogInstance> {
        self.stack.last_mut()
    }

    pub(crate) fn push(&mut self, instance: DialogInstance) {
        self.stack.push(instance);
    }

    pub(crate) fn pop(&mut self) -> Option<DialogInstance> {
        self.stack.pop()
    }
}
