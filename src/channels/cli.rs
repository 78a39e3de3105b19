//! CLI channel — stdin/stdout REPL for local testing.

use async_trait::async_trait;
use futures::stream;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use crate::channels::{
    ADAPTIVE_CARD_CONTENT_TYPE, Activity, Attachment, Channel, ChannelAccount,
    HERO_CARD_CONTENT_TYPE, MessageStream, OutgoingActivity, TurnResponse,
};
use crate::error::ChannelError;

const CHANNEL_ID: &str = "cli";
const CONVERSATION_ID: &str = "local-conversation";

/// Reads one message per line from stdin and prints replies to stdout.
///
/// On start it announces the local user as a new member, so the bot greets
/// before the first line is typed. `/quit` ends the stream.
pub struct CliChannel {
    user_id: String,
    started: Mutex<bool>,
}

impl CliChannel {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            started: Mutex::new(false),
        }
    }
}

impl Default for CliChannel {
    fn default() -> Self {
        Self::new("local-user")
    }
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        CHANNEL_ID
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        let mut started = self.started.lock().await;
        if *started {
            return Err(ChannelError::StartupFailed {
                name: CHANNEL_ID.to_string(),
                reason: "start() already called".to_string(),
            });
        }
        *started = true;

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let user_id = self.user_id.clone();

        let joined = Activity::members_added(
            CHANNEL_ID,
            CONVERSATION_ID,
            vec![ChannelAccount::new(user_id.clone())],
        );
        let _ = tx.send(joined);

        tokio::spawn(async move {
            let stdin = tokio::io::stdin();
            let reader = BufReader::new(stdin);
            let mut lines = reader.lines();

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let line = line.trim().to_string();
                        if line == "/quit" {
                            break;
                        }
                        // Empty lines are still turns: a prompt may accept them.
                        let msg = Activity::message(CHANNEL_ID, CONVERSATION_ID, &user_id, line);
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break, // EOF
                    Err(e) => {
                        tracing::error!("Error reading stdin: {}", e);
                        break;
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn respond(
        &self,
        _activity: &Activity,
        response: &TurnResponse,
    ) -> Result<(), ChannelError> {
        for activity in &response.activities {
            println!("\n{}", render_for_terminal(activity));
        }
        eprint!("> ");
        Ok(())
    }
}

/// Plain-text rendering of an outbound activity.
pub fn render_for_terminal(activity: &OutgoingActivity) -> String {
    let mut lines: Vec<String> = Vec::new();
    if let Some(text) = &activity.text {
        lines.push(text.clone());
    }
    for attachment in &activity.attachments {
        lines.push(describe_attachment(attachment));
    }
    if !activity.suggested_actions.is_empty() {
        let options: Vec<&str> = activity
            .suggested_actions
            .iter()
            .map(|a| a.title.as_str())
            .collect();
        lines.push(format!("({})", options.join(" / ")));
    }
    lines.join("\n")
}

fn describe_attachment(attachment: &Attachment) -> String {
    let content = attachment.content.as_ref();
    match attachment.content_type.as_str() {
        HERO_CARD_CONTENT_TYPE => {
            let title = content
                .and_then(|c| c["title"].as_str())
                .unwrap_or_default();
            let buttons: Vec<&str> = content
                .and_then(|c| c["buttons"].as_array())
                .map(|b| b.iter().filter_map(|b| b["title"].as_str()).collect())
                .unwrap_or_default();
            format!("[{title}] {}", buttons.join(" | "))
        }
        ADAPTIVE_CARD_CONTENT_TYPE => {
            let texts: Vec<&str> = content
                .and_then(|c| c["body"].as_array())
                .map(|body| body.iter().filter_map(|e| e["text"].as_str()).collect())
                .unwrap_or_default();
            format!("[card] {}", texts.join(" "))
        }
        other => match (&attachment.content_url, content) {
            (Some(url), _) => format!("[{other}] {url}"),
            (None, Some(Value::String(s))) => format!("[{other}] {s}"),
            _ => format!("[{other}]"),
        },
    }
}
