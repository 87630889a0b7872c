//! Slack Web API client
//!
//! Plain-text posts go through slack-morphism; Block Kit payloads and
//! `views.open` are sent as raw JSON so the builders stay `serde_json::Value`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::SlackApiChatPostMessageRequest;
use slack_morphism::{SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent};
use tracing::debug;

use super::platform::ChatPlatform;
use crate::core::models::{Delivery, OutboundMessage};
use crate::errors::BotError;

const SLACK_API_BASE: &str = "https://slack.com/api";

static HTTP_CLIENT: std::sync::LazyLock<Client> = std::sync::LazyLock::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
});

/// Bot-token Slack client. No retries: a failed call is reported once.
pub struct SlackClient {
    client: Arc<SlackHyperClient>,
    token: SlackApiToken,
}

impl SlackClient {
    /// # Errors
    ///
    /// Returns an error if the HTTPS connector cannot be built.
    pub fn new(token: String) -> Result<Self, BotError> {
        let connector = SlackClientHyperConnector::new().map_err(|e| {
            BotError::HttpError(format!("Failed to create Slack HTTP connector: {e}"))
        })?;
        Ok(Self {
            client: Arc::new(SlackHyperClient::new(connector)),
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        })
    }

    /// The shared slack-morphism client, reused by the Socket Mode listener.
    #[must_use]
    pub fn hyper_client(&self) -> Arc<SlackHyperClient> {
        Arc::clone(&self.client)
    }

    async fn post_text(&self, channel: &str, text: &str) -> Result<Delivery, BotError> {
        let session = self.client.open_session(&self.token);
        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        let resp = session.chat_post_message(&post_req).await?;
        Ok(Delivery {
            channel: resp.channel.0,
            ts: resp.ts.0,
        })
    }

    async fn post_blocks(
        &self,
        channel: &str,
        text_fallback: &str,
        blocks: &Value,
    ) -> Result<Delivery, BotError> {
        let payload = json!({
            "channel": channel,
            "text": text_fallback,
            "blocks": blocks,
        });

        let body = self.call_api("chat.postMessage", &payload).await?;
        Ok(Delivery {
            channel: body
                .get("channel")
                .and_then(Value::as_str)
                .unwrap_or(channel)
                .to_string(),
            ts: body
                .get("ts")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    async fn call_api(&self, method: &str, payload: &Value) -> Result<Value, BotError> {
        let resp = HTTP_CLIENT
            .post(format!("{SLACK_API_BASE}/{method}"))
            .bearer_auth(&self.token.token_value.0)
            .json(payload)
            .send()
            .await
            .map_err(|e| BotError::HttpError(format!("{method}: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotError::ApiError(format!(
                "{method} HTTP {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| BotError::ParseError(format!("{method} JSON parse error: {e}")))?;

        check_ok(method, &body)?;
        Ok(body)
    }
}

/// Slack answers HTTP 200 even for failures; the verdict is in `ok`.
fn check_ok(method: &str, body: &Value) -> Result<(), BotError> {
    if body.get("ok").and_then(Value::as_bool).unwrap_or(false) {
        Ok(())
    } else {
        Err(BotError::ApiError(format!(
            "{method} error: {}",
            body.get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
        )))
    }
}

#[async_trait]
impl ChatPlatform for SlackClient {
    async fn post_message(&self, message: &OutboundMessage) -> Result<Delivery, BotError> {
        debug!(channel = %message.channel, has_blocks = message.blocks.is_some(), "chat.postMessage");
        match &message.blocks {
            Some(blocks) => {
                self.post_blocks(&message.channel, &message.text, blocks)
                    .await
            }
            None => self.post_text(&message.channel, &message.text).await,
        }
    }

    async fn open_view(&self, trigger_id: &str, view: &Value) -> Result<(), BotError> {
        let payload = json!({
            "trigger_id": trigger_id,
            "view": view
        });
        self.call_api("views.open", &payload).await.map(|_| ())
    }
}
