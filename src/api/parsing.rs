//! Turning Slack payloads into the bot's inbound event types.
//!
//! Both transports end up here: HTTP hands over form-encoded bodies, Socket
//! Mode hands over slack-morphism events that are re-read as JSON.

use std::collections::HashMap;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::core::models::{ActionClick, FormSubmission, SlashCommand};
use crate::errors::BotError;

/// An interaction the dispatcher knows how to route.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    Submission(FormSubmission),
    /// One entry per element in `actions`; Slack sends one in practice.
    Actions(Vec<ActionClick>),
    Unsupported(String),
}

/// Decode one `application/x-www-form-urlencoded` component.
///
/// # Errors
///
/// Returns an error message if the decoded bytes are not UTF-8.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    // '+' means space only before percent-decoding; "%2B" is a literal '+'.
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| format!("Failed to decode URL component: {e}"))
}

/// Parse a form body into key/value pairs. Pairs without `=` are skipped.
///
/// # Errors
///
/// Returns `BotError::ParseError` if a key or value fails to decode.
pub fn parse_form(body: &str) -> Result<HashMap<String, String>, BotError> {
    let mut map = HashMap::new();
    for pair in body.split('&') {
        let Some((raw_key, raw_value)) = pair.split_once('=') else {
            continue;
        };
        let key = decode_url_component(raw_key).map_err(BotError::ParseError)?;
        let value = decode_url_component(raw_value).map_err(BotError::ParseError)?;
        map.insert(key, value);
    }
    Ok(map)
}

#[must_use]
pub fn is_interactive_body(body: &str) -> bool {
    body.starts_with("payload=") || body.contains("&payload=")
}

/// Extract and parse the JSON `payload` field of an interactive request.
///
/// # Errors
///
/// Returns `BotError::ParseError` if the field is missing or not valid JSON.
pub fn parse_interactive_payload(form_body: &str) -> Result<Value, BotError> {
    let form = parse_form(form_body)?;
    let raw = form
        .get("payload")
        .ok_or_else(|| BotError::ParseError("Missing payload field".to_string()))?;
    serde_json::from_str(raw)
        .map_err(|e| BotError::ParseError(format!("Invalid JSON payload: {e}")))
}

/// Build a `SlashCommand` from a slash command form body.
///
/// # Errors
///
/// Returns `BotError::ParseError` if the body cannot be decoded or has no
/// `command` or `user_id`.
pub fn parse_slash_command(form_body: &str) -> Result<SlashCommand, BotError> {
    let form = parse_form(form_body)?;
    let field = |key: &str| form.get(key).cloned().unwrap_or_default();
    build_slash_command(
        field("command"),
        field("user_id"),
        field("channel_id"),
        field("text"),
        field("trigger_id"),
    )
}

/// Build a `SlashCommand` from its JSON form (slack-morphism's `SlackCommandEvent`).
///
/// # Errors
///
/// Returns `BotError::ParseError` if `command` or `user_id` is missing.
pub fn slash_command_from_json(event: &Value) -> Result<SlashCommand, BotError> {
    let field = |key: &str| v_str(event, &[key]).unwrap_or("").to_string();
    build_slash_command(
        field("command"),
        field("user_id"),
        field("channel_id"),
        field("text"),
        field("trigger_id"),
    )
}

fn build_slash_command(
    command: String,
    user_id: String,
    channel_id: String,
    text: String,
    trigger_id: String,
) -> Result<SlashCommand, BotError> {
    if command.is_empty() {
        return Err(BotError::ParseError("Slash command without command".to_string()));
    }
    if user_id.is_empty() {
        return Err(BotError::ParseError("Slash command without user_id".to_string()));
    }
    Ok(SlashCommand {
        command,
        user_id,
        channel_id,
        text,
        trigger_id,
    })
}

/// Classify an interaction payload by its `type`.
///
/// # Errors
///
/// Returns `BotError::ParseError` if the acting user or a required field of
/// a known interaction type is missing.
pub fn parse_interaction(payload: &Value) -> Result<Interaction, BotError> {
    let payload_type = v_str(payload, &["type"]).unwrap_or("");
    match payload_type {
        "view_submission" => parse_view_submission(payload).map(Interaction::Submission),
        "block_actions" => parse_block_actions(payload).map(Interaction::Actions),
        other => Ok(Interaction::Unsupported(other.to_string())),
    }
}

fn acting_user(payload: &Value) -> Result<String, BotError> {
    v_str(payload, &["user", "id"])
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| BotError::ParseError("user.id missing".to_string()))
}

fn parse_view_submission(payload: &Value) -> Result<FormSubmission, BotError> {
    let submitter_id = acting_user(payload)?;
    let view = payload
        .get("view")
        .ok_or_else(|| BotError::ParseError("Missing view in payload".to_string()))?;
    let values = v_path(view, &["state", "values"])
        .cloned()
        .ok_or_else(|| BotError::ParseError("view.state.values missing".to_string()))?;

    Ok(FormSubmission {
        callback_id: v_str(view, &["callback_id"]).unwrap_or("").to_string(),
        submitter_id,
        values,
    })
}

fn parse_block_actions(payload: &Value) -> Result<Vec<ActionClick>, BotError> {
    let clicker_id = acting_user(payload)?;
    let channel_id = v_str(payload, &["channel", "id"])
        .or_else(|| v_str(payload, &["container", "channel_id"]))
        .map(str::to_string);
    let message_ts = v_str(payload, &["container", "message_ts"])
        .or_else(|| v_str(payload, &["message", "ts"]))
        .map(str::to_string);

    let actions = v_array(payload, &["actions"])
        .ok_or_else(|| BotError::ParseError("actions missing".to_string()))?;

    Ok(actions
        .iter()
        .map(|action| ActionClick {
            action_id: v_str(action, &["action_id"]).unwrap_or("").to_string(),
            value: v_str(action, &["value"]).unwrap_or("").to_string(),
            clicker_id: clicker_id.clone(),
            channel_id: channel_id.clone(),
            message_ts: message_ts.clone(),
        })
        .collect())
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn v_array<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    v_path(root, path).and_then(|v| v.as_array())
}
