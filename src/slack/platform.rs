//! The outbound half of the chat platform, as seen by the workflow.

use async_trait::async_trait;
use serde_json::Value;

use crate::core::models::{Delivery, OutboundMessage};
use crate::errors::BotError;

#[async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Post a message (`chat.postMessage`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Slack rejects it.
    async fn post_message(&self, message: &OutboundMessage) -> Result<Delivery, BotError>;

    /// Open a modal for the user who produced `trigger_id` (`views.open`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, or the trigger is invalid or expired.
    async fn open_view(&self, trigger_id: &str, view: &Value) -> Result<(), BotError>;
}
