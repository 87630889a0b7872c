//! HTTP transport: a thin router in front of the dispatcher.
//!
//! This module handles:
//! - Request validation (signature headers, replay window)
//! - Interactive components (`payload=` form bodies)
//! - Slash commands (plain form bodies)
//!
//! Every Slack request is answered only after the dispatcher acknowledged it.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use serde_json::Value;
use tracing::{error, info, warn};

use super::helpers::{err_response, error_to_response, ok_empty};
use super::{deliver_interaction, parsing, signature};
use crate::dispatcher::EventSender;
use crate::errors::BotError;

pub const EVENTS_PATH: &str = "/slack/events";

#[derive(Clone)]
pub struct HttpState {
    events: EventSender,
    signing_secret: Arc<str>,
}

impl HttpState {
    #[must_use]
    pub fn new(events: EventSender, signing_secret: &str) -> Self {
        Self {
            events,
            signing_secret: Arc::from(signing_secret),
        }
    }
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route(EVENTS_PATH, post(slack_events))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind `addr` and serve until `shutdown` resolves.
///
/// # Errors
///
/// Returns `BotError::HttpError` if the address cannot be bound or the server fails.
pub async fn serve<F>(addr: SocketAddr, state: HttpState, shutdown: F) -> Result<(), BotError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| BotError::HttpError(format!("Failed to bind {addr}: {e}")))?;
    info!("Slack events endpoint listening on http://{}{}", addr, EVENTS_PATH);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BotError::HttpError(format!("Server error: {e}")))
}

async fn health() -> &'static str {
    "ok"
}

async fn slack_events(
    State(state): State<HttpState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    if let Err(response) = verify_request(&headers, &body, &state.signing_secret) {
        return response;
    }

    // Events API URL verification handshake
    if let Ok(json_body) = serde_json::from_str::<Value>(&body)
        && json_body.get("type").and_then(Value::as_str) == Some("url_verification")
    {
        let challenge = json_body
            .get("challenge")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return (StatusCode::OK, challenge).into_response();
    }

    let delivered = if parsing::is_interactive_body(&body) {
        match parsing::parse_interactive_payload(&body).and_then(|p| parsing::parse_interaction(&p))
        {
            Ok(interaction) => deliver_interaction(&state.events, interaction).await,
            Err(e) => Err(e),
        }
    } else {
        match parsing::parse_slash_command(&body) {
            Ok(command) => state.events.deliver(command).await,
            Err(e) => Err(e),
        }
    };

    match delivered {
        Ok(()) => ok_empty(),
        Err(e) => {
            error!("Failed to accept Slack request: {}", e);
            error_to_response(&e)
        }
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn verify_request(headers: &HeaderMap, body: &str, signing_secret: &str) -> Result<(), Response> {
    let Some(sig) = header(headers, "X-Slack-Signature") else {
        warn!("Missing X-Slack-Signature header");
        return Err(err_response(
            StatusCode::UNAUTHORIZED,
            "Missing X-Slack-Signature header",
        ));
    };

    let Some(timestamp) = header(headers, "X-Slack-Request-Timestamp") else {
        warn!("Missing X-Slack-Request-Timestamp header");
        return Err(err_response(
            StatusCode::UNAUTHORIZED,
            "Missing X-Slack-Request-Timestamp header",
        ));
    };

    if !signature::verify_slack_signature(body, timestamp, sig, signing_secret) {
        return Err(err_response(
            StatusCode::UNAUTHORIZED,
            "Invalid Slack signature",
        ));
    }

    Ok(())
}
