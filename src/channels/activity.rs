//! Activity wire types — what a channel delivers to the bot and what the bot
//! sends back.

use serde::{Deserialize, Serialize};

/// Content type of adaptive card attachments.
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";
/// Content type of hero card attachments.
pub const HERO_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.hero";

/// Kind of inbound activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivityType {
    Message,
    ConversationUpdate,
    Invoke,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message => write!(f, "message"),
            Self::ConversationUpdate => write!(f, "conversationUpdate"),
            Self::Invoke => write!(f, "invoke"),
        }
    }
}

/// A user or bot account on a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelAccount {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChannelAccount {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

/// The conversation an activity belongs to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationAccount {
    pub id: String,
}

/// A file or card attached to an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Attachment {
    /// An attachment referring to a file by URL.
    pub fn file(content_type: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content_url: Some(url.into()),
            content: None,
            name: None,
        }
    }

    /// An attachment carrying an inline JSON card.
    pub fn card(content_type: impl Into<String>, content: serde_json::Value) -> Self {
        Self {
            content_type: content_type.into(),
            content_url: None,
            content: Some(content),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// An inbound activity from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub from: ChannelAccount,
    #[serde(default)]
    pub recipient: ChannelAccount,
    #[serde(default)]
    pub conversation: ConversationAccount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members_added: Vec<ChannelAccount>,
    /// Invoke name, e.g. `task/fetch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Invoke payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Activity {
    /// Create a text message from `user` in `conversation` on `channel`.
    pub fn message(
        channel: impl Into<String>,
        conversation: impl Into<String>,
        user: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let mut activity = Self::empty(ActivityType::Message, channel, conversation, user);
        activity.text = Some(text.into());
        activity
    }

    /// Create a conversation-update activity announcing `members` joined.
    pub fn members_added(
        channel: impl Into<String>,
        conversation: impl Into<String>,
        members: Vec<ChannelAccount>,
    ) -> Self {
        let mut activity =
            Self::empty(ActivityType::ConversationUpdate, channel, conversation, "");
        activity.from = members.first().cloned().unwrap_or_default();
        activity.members_added = members;
        activity
    }

    /// Create an invoke activity with the given name and payload.
    pub fn invoke(
        channel: impl Into<String>,
        conversation: impl Into<String>,
        user: impl Into<String>,
        name: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        let mut activity = Self::empty(ActivityType::Invoke, channel, conversation, user);
        activity.name = Some(name.into());
        activity.value = Some(value);
        activity
    }

    fn empty(
        activity_type: ActivityType,
        channel: impl Into<String>,
        conversation: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            activity_type,
            id: None,
            channel_id: channel.into(),
            from: ChannelAccount::new(user),
            recipient: ChannelAccount::new(BOT_ACCOUNT_ID),
            conversation: ConversationAccount {
                id: conversation.into(),
            },
            text: None,
            attachments: Vec::new(),
            members_added: Vec::new(),
            name: None,
            value: None,
        }
    }

    /// Attach files to this activity.
    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    /// Set the display name of the sender.
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.from.name = Some(name.into());
        self
    }

    /// Message text, or the empty string.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }
}

/// Default id of the bot's own account.
pub const BOT_ACCOUNT_ID: &str = "bot";

/// Hint telling the channel whether the bot expects a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputHint {
    AcceptingInput,
    ExpectingInput,
    IgnoringInput,
}

/// A quick-reply button suggested with an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub title: String,
    pub value: String,
}

/// An outbound activity from the bot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingActivity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speak: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<SuggestedAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hint: Option<InputHint>,
}

impl OutgoingActivity {
    /// A plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A message carrying a single attachment.
    pub fn attachment(attachment: Attachment) -> Self {
        Self {
            attachments: vec![attachment],
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_speak(mut self, speak: impl Into<String>) -> Self {
        self.speak = Some(speak.into());
        self
    }

    pub fn with_input_hint(mut self, hint: InputHint) -> Self {
        self.input_hint = Some(hint);
        self
    }
}

/// Response body for an invoke activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

impl InvokeResponse {
    pub fn ok(body: Option<serde_json::Value>) -> Self {
        Self { status: 200, body }
    }

    pub fn not_implemented() -> Self {
        Self {
            status: 501,
            body: None,
        }
    }
}

/// Everything a single turn produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub activities: Vec<OutgoingActivity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoke_response: Option<InvokeResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_parses_wire_json() {
        let json = serde_json::json!({
            "type": "message",
            "channelId": "msteams",
            "from": {"id": "user-1", "name": "Ada"},
            "recipient": {"id": "bot"},
            "conversation": {"id": "conv-1"},
            "text": "get profile",
            "attachments": [{"contentType": "image/png", "contentUrl": "https://x/a.png"}]
        });
        let activity: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Message);
        assert_eq!(activity.channel_id, "msteams");
        assert_eq!(activity.from.name.as_deref(), Some("Ada"));
        assert_eq!(activity.text(), "get profile");
        assert_eq!(activity.attachments[0].content_type, "image/png");
    }

    #[test]
    fn invoke_activity_parses() {
        let json = serde_json::json!({
            "type": "invoke",
            "name": "task/fetch",
            "conversation": {"id": "c"},
            "value": {"data": {"data": "youtube"}}
        });
        let activity: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(activity.activity_type, ActivityType::Invoke);
        assert_eq!(activity.name.as_deref(), Some("task/fetch"));
        assert_eq!(activity.text(), "");
    }

    #[test]
    fn outgoing_skips_empty_fields() {
        let out = OutgoingActivity::text("hi");
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hi"}));
    }

    #[test]
    fn members_added_sets_sender() {
        let activity = Activity::members_added("cli", "c1", vec![ChannelAccount::new("u1")]);
        assert_eq!(activity.activity_type, ActivityType::ConversationUpdate);
        assert_eq!(activity.from.id, "u1");
        assert_eq!(activity.recipient.id, BOT_ACCOUNT_ID);
    }
}
