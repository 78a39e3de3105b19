//! Card builders. Pure functions from UI descriptors to attachments.

use serde_json::{Value, json};

use crate::channels::{
    ADAPTIVE_CARD_CONTENT_TYPE, Attachment, HERO_CARD_CONTENT_TYPE, OutgoingActivity,
};
use crate::error::RenderError;

use super::task_module::{HERO_CARD_MODULES, TASK_FETCH};

const WELCOME_CARD: &str = include_str!("../../resources/welcome_card.json");
const ADAPTIVE_CARD: &str = include_str!("../../resources/adaptive_card.json");

pub const HERO_CARD_TITLE: &str = "Task Module Invocation from Hero Card";
pub const WELCOME_SPEAK: &str = "Welcome to Bot Framework!";
pub const PICTURE_CAPTION: &str = "This is your profile picture.";

/// Welcome adaptive card sent to newly added members.
pub fn welcome_card() -> Result<Attachment, serde_json::Error> {
    let content: Value = serde_json::from_str(WELCOME_CARD)?;
    Ok(Attachment::card(ADAPTIVE_CARD_CONTENT_TYPE, content))
}

/// The welcome message: card plus spoken greeting.
pub fn welcome_message() -> Result<OutgoingActivity, serde_json::Error> {
    Ok(OutgoingActivity::attachment(welcome_card()?).with_speak(WELCOME_SPEAK))
}

/// Hero card with one task-module button per module.
pub fn task_module_hero_card() -> Attachment {
    let buttons: Vec<Value> = HERO_CARD_MODULES
        .iter()
        .map(|ui| {
            json!({
                "type": "invoke",
                "title": ui.button_title,
                "value": { "type": TASK_FETCH, "data": ui.id },
            })
        })
        .collect();

    Attachment::card(
        HERO_CARD_CONTENT_TYPE,
        json!({
            "title": HERO_CARD_TITLE,
            "buttons": buttons,
        }),
    )
}

/// Adaptive card shown inside the "adaptivecard" task module.
pub fn adaptive_card_task() -> Result<Attachment, serde_json::Error> {
    let content: Value = serde_json::from_str(ADAPTIVE_CARD)?;
    Ok(Attachment::card(ADAPTIVE_CARD_CONTENT_TYPE, content))
}

/// Echo a saved profile picture back to the user.
pub fn render_picture(picture: &Attachment) -> Result<OutgoingActivity, RenderError> {
    if picture.content_url.is_none() && picture.content.is_none() {
        return Err(RenderError::MissingContent);
    }
    if !picture.content_type.starts_with("image/") {
        return Err(RenderError::UnsupportedContentType(
            picture.content_type.clone(),
        ));
    }
    Ok(OutgoingActivity::attachment(picture.clone()).with_text(PICTURE_CAPTION))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_cards_parse() {
        let welcome = welcome_card().unwrap();
        assert_eq!(welcome.content_type, ADAPTIVE_CARD_CONTENT_TYPE);
        assert_eq!(welcome.content.unwrap()["type"], "AdaptiveCard");

        let message = welcome_message().unwrap();
        assert_eq!(message.speak.as_deref(), Some(WELCOME_SPEAK));
        assert_eq!(message.attachments.len(), 1);

        assert!(adaptive_card_task().unwrap().content.is_some());
    }

    #[test]
    fn hero_card_buttons_in_order() {
        let card = task_module_hero_card();
        assert_eq!(card.content_type, HERO_CARD_CONTENT_TYPE);
        let content = card.content.unwrap();
        assert_eq!(content["title"], HERO_CARD_TITLE);

        let buttons = content["buttons"].as_array().unwrap();
        let titles: Vec<&str> = buttons.iter().map(|b| b["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Custom Form", "Adaptive Card", "YouTube"]);
        assert_eq!(buttons[2]["type"], "invoke");
        assert_eq!(
            buttons[2]["value"],
            json!({"type": "task/fetch", "data": "youtube"})
        );
    }

    #[test]
    fn picture_renders_with_caption() {
        let picture = Attachment::file("image/png", "https://x/a.png");
        let rendered = render_picture(&picture).unwrap();
        assert_eq!(rendered.text.as_deref(), Some(PICTURE_CAPTION));
        assert_eq!(rendered.attachments, vec![picture]);
    }

    #[test]
    fn unrenderable_pictures_fail() {
        let empty = Attachment {
            content_type: "image/png".into(),
            content_url: None,
            content: None,
            name: None,
        };
        assert!(matches!(render_picture(&empty), Err(RenderError::MissingContent)));

        let doc = Attachment::file("application/pdf", "https://x/a.pdf");
        assert!(matches!(
            render_picture(&doc),
            Err(RenderError::UnsupportedContentType(t)) if t == "application/pdf"
        ));
    }
}
