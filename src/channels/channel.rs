//! The `Channel` trait implemented by every conversational transport.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::channels::{Activity, TurnResponse};
use crate::error::ChannelError;

/// Stream of inbound activities from a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = Activity> + Send>>;

/// A transport that produces activities and displays turn responses.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel id. Activities produced by this channel carry it as `channel_id`.
    fn name(&self) -> &str;

    /// Start receiving. May only be called once.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver the committed output of a turn.
    async fn respond(
        &self,
        activity: &Activity,
        response: &TurnResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
