//! "get profile2": open a task module, confirm what came back.

use crate::channels::OutgoingActivity;
use crate::dialogs::{PromptOptions, StepContext, StepResult, Waterfall, choices};
use crate::error::Result;

use super::cards;
use super::dialog_ids::{CONFIRM_PROMPT, TASK_TEXT_PROMPT, USER_PROFILE_TASK_DIALOG};
use super::profile::AGE_UNSET;
use super::profile_dialog::summary_step;

pub fn user_profile_task_dialog() -> Waterfall {
    Waterfall::new(USER_PROFILE_TASK_DIALOG)
        .step("launch", launch_step)
        .step("confirm", confirm_step)
        .step("summary", summary_step)
}

fn launch_step(_step: &mut StepContext<'_>) -> Result<StepResult> {
    let card = OutgoingActivity::attachment(cards::task_module_hero_card());
    let options = PromptOptions::activity(card)
        .with_choices(choices(&["Adaptive Card", "Custom Form", "YouTube"]));
    Ok(StepResult::prompt(TASK_TEXT_PROMPT, options))
}

fn confirm_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let result = match step.result_str() {
        Some(text) => text.to_string(),
        None => step.result.to_string(),
    };
    let name = step
        .turn
        .activity()
        .from
        .name
        .clone()
        .unwrap_or_default();

    // The shared summary step reads the same keys as the full profile dialog.
    step.set_value("transport", &result)?;
    step.set_value("name", &name)?;
    step.set_value("age", &AGE_UNSET)?;

    Ok(StepResult::prompt(
        CONFIRM_PROMPT,
        PromptOptions::text(format!("Result from Task Module: {result}, Is this ok?")),
    ))
}
