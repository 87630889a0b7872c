#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use approval_bot::BotError;
use approval_bot::core::models::{
    ActionClick, Delivery, FormSubmission, OutboundMessage, SlashCommand,
};
use approval_bot::dispatcher::Ack;
use approval_bot::slack::ChatPlatform;
use async_trait::async_trait;
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ack(String),
    Post(OutboundMessage),
    OpenView { trigger_id: String, view: Value },
}

/// In-memory `ChatPlatform` that records every call, acks included, in order.
#[derive(Clone, Default)]
pub struct RecordingPlatform {
    log: Arc<Mutex<Vec<Call>>>,
    next_ts: Arc<AtomicU64>,
    fail_posts: bool,
    fail_views: bool,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_posts() -> Self {
        Self {
            fail_posts: true,
            ..Self::default()
        }
    }

    pub fn failing_views() -> Self {
        Self {
            fail_views: true,
            ..Self::default()
        }
    }

    /// An ack that records itself in the same log as outbound calls.
    pub fn ack(&self, label: &str) -> Ack {
        let log = Arc::clone(&self.log);
        let label = label.to_string();
        Ack::new(move || log.lock().unwrap().push(Call::Ack(label)))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.lock().unwrap().clone()
    }

    pub fn posts(&self) -> Vec<OutboundMessage> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Post(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    pub fn views(&self) -> Vec<(String, Value)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::OpenView { trigger_id, view } => Some((trigger_id, view)),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChatPlatform for RecordingPlatform {
    async fn post_message(&self, message: &OutboundMessage) -> Result<Delivery, BotError> {
        self.log.lock().unwrap().push(Call::Post(message.clone()));
        if self.fail_posts {
            return Err(BotError::ApiError("chat.postMessage error: channel_not_found".into()));
        }
        let n = self.next_ts.fetch_add(1, Ordering::SeqCst);
        Ok(Delivery {
            channel: message.channel.clone(),
            ts: format!("1700000000.{n:06}"),
        })
    }

    async fn open_view(&self, trigger_id: &str, view: &Value) -> Result<(), BotError> {
        self.log.lock().unwrap().push(Call::OpenView {
            trigger_id: trigger_id.to_string(),
            view: view.clone(),
        });
        if self.fail_views {
            return Err(BotError::ApiError("views.open error: expired_trigger_id".into()));
        }
        Ok(())
    }
}

pub fn slash(command: &str, user_id: &str, text: &str) -> SlashCommand {
    SlashCommand {
        command: command.to_string(),
        user_id: user_id.to_string(),
        channel_id: "C100".to_string(),
        text: text.to_string(),
        trigger_id: "trigger.123".to_string(),
    }
}

pub fn approval_values(approver_id: &str, body: Option<&str>) -> Value {
    json!({
        "approver_block": {
            "approver": { "type": "users_select", "selected_user": approver_id }
        },
        "approval_text_block": {
            "approval_text": { "type": "plain_text_input", "value": body }
        }
    })
}

pub fn submission(submitter_id: &str, approver_id: &str, body: &str) -> FormSubmission {
    FormSubmission {
        callback_id: "approval_request_modal".to_string(),
        submitter_id: submitter_id.to_string(),
        values: approval_values(approver_id, Some(body)),
    }
}

pub fn click(action_id: &str, requester_id: &str, clicker_id: &str) -> ActionClick {
    ActionClick {
        action_id: action_id.to_string(),
        value: requester_id.to_string(),
        clicker_id: clicker_id.to_string(),
        channel_id: Some("D200".to_string()),
        message_ts: Some("1700000000.000001".to_string()),
    }
}
