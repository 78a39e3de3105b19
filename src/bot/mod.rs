//! The task-module bot: its dialogs, validators, cards and turn handler.

pub mod cards;
pub mod dialog_bot;
pub mod main_dialog;
pub mod profile;
pub mod profile_dialog;
pub mod task_dialog;
pub mod task_module;
pub mod validators;

pub use dialog_bot::DialogBot;
pub use profile::{USER_PROFILE_PROPERTY, UserProfile};

use crate::dialogs::{DialogSet, Prompt, PromptKind};
use crate::error::ConfigError;

/// Registry ids. One flat namespace shared by waterfalls and prompts.
pub mod dialog_ids {
    pub const MAIN_DIALOG: &str = "MainDialog";
    pub const USER_PROFILE_DIALOG: &str = "UserProfileDialog";
    pub const USER_PROFILE_TASK_DIALOG: &str = "UserProfileTaskDialog";

    pub const TEXT_PROMPT: &str = "TextPrompt";
    pub const TASK_TEXT_PROMPT: &str = "TaskTextPrompt";
    pub const NUMBER_PROMPT: &str = "NumberPrompt";
    pub const CHOICE_PROMPT: &str = "ChoicePrompt";
    pub const CONFIRM_PROMPT: &str = "ConfirmPrompt";
    pub const ATTACHMENT_PROMPT: &str = "AttachmentPrompt";
}

/// Register every dialog and prompt the bot uses.
pub fn build_dialogs() -> Result<DialogSet, ConfigError> {
    use dialog_ids::*;

    DialogSet::new()
        .with(main_dialog::main_dialog())?
        .with(profile_dialog::user_profile_dialog())?
        .with(task_dialog::user_profile_task_dialog())?
        .with(Prompt::new(TEXT_PROMPT, PromptKind::Text))?
        .with(
            Prompt::new(TASK_TEXT_PROMPT, PromptKind::Text)
                .with_validator(validators::task_validator),
        )?
        .with(
            Prompt::new(NUMBER_PROMPT, PromptKind::Number)
                .with_validator(validators::age_validator),
        )?
        .with(Prompt::new(CHOICE_PROMPT, PromptKind::Choice))?
        .with(Prompt::new(CONFIRM_PROMPT, PromptKind::Confirm))?
        .with(
            Prompt::new(ATTACHMENT_PROMPT, PromptKind::Attachment)
                .with_validator(validators::picture_validator),
        )
}
