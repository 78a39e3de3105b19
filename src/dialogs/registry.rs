//! Dialog registry.
//!
//! Built once at startup and shared immutably by every conversation.

use std::collections::HashMap;

use crate::error::ConfigError;

use super::prompts::Prompt;
use super::waterfall::Waterfall;

/// The closed set of dialog kinds.
#[derive(Debug)]
pub enum Dialog {
    Waterfall(Waterfall),
    Prompt(Prompt),
}

impl Dialog {
    pub fn id(&self) -> &str {
        match self {
            Self::Waterfall(w) => w.id(),
            Self::Prompt(p) => p.id(),
        }
    }

    fn kind_name(&self) -> String {
        match self {
            Self::Waterfall(_) => "waterfall".to_string(),
            Self::Prompt(p) => format!("{} prompt", p.kind()),
        }
    }
}

impl From<Waterfall> for Dialog {
    fn from(waterfall: Waterfall) -> Self {
        Self::Waterfall(waterfall)
    }
}

impl From<Prompt> for Dialog {
    fn from(prompt: Prompt) -> Self {
        Self::Prompt(prompt)
    }
}

/// Registry of dialogs keyed by their own id.
#[derive(Debug, Default)]
pub struct DialogSet {
    dialogs: HashMap<String, Dialog>,
}

impl DialogSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dialog. Ids must be unique across all kinds.
    pub fn add(&mut self, dialog: impl Into<Dialog>) -> Result<(), ConfigError> {
        let dialog = dialog.into();
        let id = dialog.id().to_string();
        if self.dialogs.contains_key(&id) {
            return Err(ConfigError::DuplicateDialog { id });
        }
        tracing::debug!(dialog_id = %id, kind = %dialog.kind_name(), "Registered dialog");
        self.dialogs.insert(id, dialog);
        Ok(())
    }

    /// Builder form of [`add`](Self::add).
    pub fn with(mut self, dialog: impl Into<Dialog>) -> Result<Self, ConfigError> {
        self.add(dialog)?;
        Ok(self)
    }

    pub fn find(&self, id: &str) -> Result<&Dialog, ConfigError> {
        self.dialogs
            .get(id)
            .ok_or_else(|| ConfigError::DialogNotFound { id: id.to_string() })
    }

    /// Look up a dialog that can sit on the stack.
    pub fn find_waterfall(&self, id: &str) -> Result<&Waterfall, ConfigError> {
        match self.find(id)? {
            Dialog::Waterfall(w) => Ok(w),
            other => Err(ConfigError::WrongDialogKind {
                id: id.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    /// Look up a prompt a step can suspend on.
    pub fn find_prompt(&self, id: &str) -> Result<&Prompt, ConfigError> {
        match self.find(id)? {
            Dialog::Prompt(p) => Ok(p),
            other => Err(ConfigError::WrongDialogKind {
                id: id.to_string(),
                kind: other.kind_name(),
            }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.dialogs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.dialogs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dialogs.is_empty()
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.dialogs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}
