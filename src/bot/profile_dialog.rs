//! "get profile": transport, name, optional age, optional picture, confirm.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::channels::Attachment;
use crate::dialogs::{PromptOptions, StepContext, StepResult, Waterfall, choices};
use crate::error::Result;

use super::cards;
use super::dialog_ids::{
    ATTACHMENT_PROMPT, CHOICE_PROMPT, CONFIRM_PROMPT, NUMBER_PROMPT, TEXT_PROMPT,
    USER_PROFILE_DIALOG,
};
use super::profile::{AGE_UNSET, USER_PROFILE_PROPERTY, UserProfile};

/// Channel on which the picture prompt is skipped.
const TEAMS_CHANNEL: &str = "msteams";

pub const PICTURE_FALLBACK: &str = "A profile picture was saved but could not be displayed here.";
pub const NOT_KEPT: &str = "Thanks. Your profile will not be kept.";

pub fn user_profile_dialog() -> Waterfall {
    Waterfall::new(USER_PROFILE_DIALOG)
        .step("transport", transport_step)
        .step("name", name_step)
        .step("name_confirm", name_confirm_step)
        .step("age", age_step)
        .step("picture", picture_step)
        .step("confirm", confirm_step)
        .step("summary", summary_step)
}

fn transport_step(_step: &mut StepContext<'_>) -> Result<StepResult> {
    let options = PromptOptions::text("Please enter your mode of transport.")
        .with_choices(choices(&["Car", "Bus", "Bicycle"]));
    Ok(StepResult::prompt(CHOICE_PROMPT, options))
}

fn name_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let transport = step.result_choice().unwrap_or_default().to_string();
    step.set_value("transport", &transport)?;
    Ok(StepResult::prompt(
        TEXT_PROMPT,
        PromptOptions::text("Please enter your name."),
    ))
}

fn name_confirm_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let name = step.result_str().unwrap_or_default().to_string();
    step.set_value("name", &name)?;
    step.turn.send_text(format!("Thanks {name}."));
    Ok(StepResult::prompt(
        CONFIRM_PROMPT,
        PromptOptions::text("Would you like to give your age?"),
    ))
}

fn age_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    if step.result_bool() == Some(true) {
        let options = PromptOptions::text("Please enter your age.")
            .with_retry_text("The value entered must be greater than 0 and less than 150.");
        Ok(StepResult::prompt(NUMBER_PROMPT, options))
    } else {
        Ok(StepResult::next(AGE_UNSET))
    }
}

fn picture_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let age = step
        .result
        .as_i64()
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(AGE_UNSET);
    step.set_value("age", &age)?;

    let message = if age == AGE_UNSET {
        "No age given.".to_string()
    } else {
        format!("I have your age as {age}.")
    };
    step.turn.send_text(message);

    if step.turn.activity().channel_id == TEAMS_CHANNEL {
        step.turn
            .send_text("Skipping attachment prompt in Teams channel...");
        return Ok(StepResult::next(Value::Null));
    }

    let options = PromptOptions::text("Please attach a profile picture (or type any message to skip).")
        .with_retry_text("The attachment must be a jpeg/png image file.");
    Ok(StepResult::prompt(ATTACHMENT_PROMPT, options))
}

fn confirm_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    let picture = step
        .result
        .as_array()
        .and_then(|list| list.first())
        .cloned()
        .unwrap_or(Value::Null);
    step.set_value("picture", &picture)?;
    Ok(StepResult::prompt(
        CONFIRM_PROMPT,
        PromptOptions::text("Is this ok?"),
    ))
}

/// Final step shared by both profile dialogs: persist on yes, discard on no.
pub(crate) fn summary_step(step: &mut StepContext<'_>) -> Result<StepResult> {
    if step.result_bool() != Some(true) {
        step.turn.send_text(NOT_KEPT);
        return Ok(StepResult::end(Value::Null));
    }

    let picture: Option<Attachment> = match step.values.get("picture") {
        Some(raw) => serde_json::from_value(raw.clone())?,
        None => None,
    };
    let profile = UserProfile {
        name: step.value("name")?,
        transport: step.value("transport")?,
        age: step.value("age")?,
        picture,
        saved_at: Some(Utc::now()),
    };

    step.turn
        .user_state_mut()
        .set(USER_PROFILE_PROPERTY, &profile)?;
    info!(dialog_id = step.name, has_picture = profile.picture.is_some(), "Profile saved");
    step.turn.send_text(profile.summary());

    if let Some(picture) = &profile.picture {
        match cards::render_picture(picture) {
            Ok(activity) => step.turn.send(activity),
            Err(e) => {
                warn!(error = %e, "Could not echo profile picture");
                step.turn.send_text(PICTURE_FALLBACK);
            }
        }
    }

    Ok(StepResult::end(serde_json::to_value(&profile)?))
}
