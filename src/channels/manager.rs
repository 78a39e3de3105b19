//! Channel manager — merges channel streams and routes turn output back.

use futures::StreamExt;
use futures::stream::select_all;
use tracing::{error, info, warn};

use crate::bot::DialogBot;
use crate::channels::{Activity, Channel, MessageStream, TurnResponse};
use crate::error::ChannelError;

/// Owns the running channels.
#[derive(Default)]
pub struct ChannelManager {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, channel: Box<dyn Channel>) {
        info!(channel = channel.name(), "Channel added");
        self.channels.push(channel);
    }

    pub fn names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Start every channel and merge their activities into one stream.
    pub async fn start_all(&self) -> Result<MessageStream, ChannelError> {
        let mut streams = Vec::with_capacity(self.channels.len());
        for channel in &self.channels {
            streams.push(channel.start().await?);
        }
        Ok(Box::pin(select_all(streams)))
    }

    /// Send a turn's output to the channel the activity came from.
    pub async fn respond(
        &self,
        activity: &Activity,
        response: &TurnResponse,
    ) -> Result<(), ChannelError> {
        let channel = self
            .channels
            .iter()
            .find(|c| c.name() == activity.channel_id)
            .ok_or_else(|| ChannelError::SendFailed {
                name: activity.channel_id.clone(),
                reason: "no such channel".to_string(),
            })?;
        channel.respond(activity, response).await
    }

    pub async fn shutdown_all(&self) -> Result<(), ChannelError> {
        for channel in &self.channels {
            channel.shutdown().await?;
        }
        Ok(())
    }

    /// Feed every inbound activity through the bot until the streams end or Ctrl+C.
    ///
    /// Activities are handled one at a time, so turns for a conversation never overlap.
    pub async fn run(&self, bot: &DialogBot) -> Result<(), ChannelError> {
        let mut activities = self.start_all().await?;

        loop {
            let activity = tokio::select! {
                biased;
                _ = tokio::signal::ctrl_c() => {
                    info!("Ctrl+C received, shutting down...");
                    break;
                }
                next = activities.next() => match next {
                    Some(activity) => activity,
                    None => {
                        info!("All channel streams ended, shutting down...");
                        break;
                    }
                }
            };

            match bot.on_turn(&activity).await {
                Ok(response) => {
                    if let Err(e) = self.respond(&activity, &response).await {
                        warn!(channel = %activity.channel_id, error = %e, "Failed to deliver turn output");
                    }
                }
                Err(e) => {
                    error!(
                        channel = %activity.channel_id,
                        conversation_id = %activity.conversation.id,
                        error = %e,
                        "Turn failed"
                    );
                }
            }
        }

        self.shutdown_all().await
    }
}
