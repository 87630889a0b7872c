//! Socket Mode transport.
//!
//! slack-morphism acknowledges an envelope when the callback returns, so each
//! callback hands its event to the dispatcher and returns only once the
//! dispatcher has acknowledged it.

use std::future::Future;
use std::sync::Arc;

use slack_morphism::prelude::*;
use tracing::{error, info};

use crate::api::deliver_interaction;
use crate::api::parsing::{Interaction, parse_interaction, slash_command_from_json};
use crate::core::models::SlashCommand;
use crate::dispatcher::EventSender;
use crate::errors::BotError;

/// Convert a Socket Mode slash command into the dispatcher's event type.
///
/// # Errors
///
/// Returns `BotError::ParseError` if the command or user is missing.
pub fn command_from_event(event: &SlackCommandEvent) -> Result<SlashCommand, BotError> {
    slash_command_from_json(&serde_json::to_value(event)?)
}

/// Convert a Socket Mode interaction through the same JSON shape as HTTP payloads.
///
/// # Errors
///
/// Returns `BotError::ParseError` for a known interaction type with missing fields.
pub fn interaction_from_event(event: &SlackInteractionEvent) -> Result<Interaction, BotError> {
    parse_interaction(&serde_json::to_value(event)?)
}

async fn on_command(
    event: SlackCommandEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> UserCallbackResult<SlackCommandEventResponse> {
    let events = event_sender(&states).await?;
    let command = command_from_event(&event)?;
    events.deliver(command).await?;

    // Empty content: a bare acknowledgment, the reply is posted separately.
    Ok(SlackCommandEventResponse::new(SlackMessageContent::new()))
}

async fn on_interaction(
    event: SlackInteractionEvent,
    _client: Arc<SlackHyperClient>,
    states: SlackClientEventsUserState,
) -> UserCallbackResult<()> {
    let events = event_sender(&states).await?;
    let interaction = interaction_from_event(&event)?;
    deliver_interaction(&events, interaction).await?;
    Ok(())
}

fn on_error(
    err: Box<dyn std::error::Error + Send + Sync>,
    _client: Arc<SlackHyperClient>,
    _states: SlackClientEventsUserState,
) -> HttpStatusCode {
    error!("Socket Mode event failed: {}", err);
    // OK still acks the envelope; Slack would otherwise redeliver it.
    HttpStatusCode::OK
}

async fn event_sender(states: &SlackClientEventsUserState) -> Result<EventSender, BotError> {
    states
        .read()
        .await
        .get_user_state::<EventSender>()
        .cloned()
        .ok_or(BotError::DispatcherClosed)
}

/// Connect with the app-level token and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns `BotError::ApiError` if the WebSocket connection cannot be opened.
pub async fn serve<F>(
    client: Arc<SlackHyperClient>,
    app_token: &str,
    events: EventSender,
    shutdown: F,
) -> Result<(), BotError>
where
    F: Future<Output = ()> + Send,
{
    let callbacks = SlackSocketModeListenerCallbacks::new()
        .with_command_events(on_command)
        .with_interaction_events(on_interaction);

    let environment = Arc::new(
        SlackClientEventsListenerEnvironment::new(client)
            .with_error_handler(on_error)
            .with_user_state(events),
    );

    let listener = SlackClientSocketModeListener::new(
        &SlackClientSocketModeConfig::new(),
        environment,
        callbacks,
    );

    let token = SlackApiToken::new(SlackApiTokenValue::new(app_token.to_string()));
    listener
        .listen_for(&token)
        .await
        .map_err(|e| BotError::ApiError(format!("Socket Mode connection failed: {e}")))?;
    info!("Connected to Slack over Socket Mode");

    listener.start().await;
    shutdown.await;

    info!("Shutting down Socket Mode listener");
    listener.shutdown().await;
    Ok(())
}
