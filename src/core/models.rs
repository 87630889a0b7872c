use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A slash command as delivered by Slack, reduced to the fields the bot reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    pub command: String,
    pub user_id: String,
    pub channel_id: String,
    pub text: String,
    pub trigger_id: String,
}

/// A modal `view_submission`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub callback_id: String,
    pub submitter_id: String,
    /// Raw `view.state.values`, keyed by block ID then action ID.
    pub values: Value,
}

/// A single element of a `block_actions` interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionClick {
    pub action_id: String,
    /// The clicked element's `value`; for approval buttons, the requester ID.
    pub value: String,
    pub clicker_id: String,
    pub channel_id: Option<String>,
    pub message_ts: Option<String>,
}

/// Values entered into the approval modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalForm {
    pub approver_id: String,
    pub body: String,
}

/// A message to be posted by the chat platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    /// Channel ID, or a user ID for a direct message.
    pub channel: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Value>,
}

impl OutboundMessage {
    #[must_use]
    pub fn text(channel: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            text: text.into(),
            blocks: None,
        }
    }
}

/// Where Slack put a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delivery {
    pub channel: String,
    pub ts: String,
}
