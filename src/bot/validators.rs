//! Prompt validators used by the profile dialogs.

use serde_json::Value;

use crate::channels::Attachment;
use crate::dialogs::PromptValidatorContext;

/// Sent when the picture prompt is answered without any attachment.
pub const NO_ATTACHMENTS_NOTICE: &str =
    "No attachments received. Proceeding without a profile picture...";

const PICTURE_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Exclusive bounds: 1 through 149.
pub fn is_valid_age(age: Option<i64>) -> bool {
    matches!(age, Some(n) if n > 0 && n < 150)
}

/// Keep only JPEG and PNG attachments.
pub fn filter_pictures(attachments: &[Attachment]) -> Vec<Attachment> {
    attachments
        .iter()
        .filter(|a| PICTURE_CONTENT_TYPES.contains(&a.content_type.as_str()))
        .cloned()
        .collect()
}

/// Number prompt: a recognized integer strictly between 0 and 150.
pub fn age_validator(ctx: &mut PromptValidatorContext<'_>) -> bool {
    ctx.recognized.succeeded && is_valid_age(ctx.recognized.value.as_i64())
}

/// Attachment prompt: keep the images, re-prompt if there were attachments but
/// none were images, carry on without a picture if nothing was attached.
pub fn picture_validator(ctx: &mut PromptValidatorContext<'_>) -> bool {
    if !ctx.recognized.succeeded {
        ctx.turn.send_text(NO_ATTACHMENTS_NOTICE);
        ctx.recognized.value = Value::Array(Vec::new());
        return true;
    }

    let attachments: Vec<Attachment> =
        serde_json::from_value(ctx.recognized.value.clone()).unwrap_or_default();
    let images = filter_pictures(&attachments);
    let accepted = !images.is_empty();
    ctx.recognized.value = serde_json::to_value(images).unwrap_or(Value::Array(Vec::new()));
    accepted
}

/// Free-text task answer: anything goes, including an empty reply.
pub fn task_validator(ctx: &mut PromptValidatorContext<'_>) -> bool {
    if !ctx.recognized.succeeded {
        ctx.recognized.value = Value::String(ctx.turn.activity().text().to_string());
    }
    true
}
