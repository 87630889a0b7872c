//! Text and Block Kit payloads for every message the bot posts.

use serde_json::{Value, json};

use crate::core::models::OutboundMessage;
use crate::workflow::state::Decision;

pub const APPROVAL_ACTIONS_BLOCK_ID: &str = "approval_actions";
pub const APPROVE_ACTION_ID: &str = "approve_request";
pub const REJECT_ACTION_ID: &str = "reject_request";

#[must_use]
pub fn greeting(user_id: &str) -> String {
    format!("Hello, <@{user_id}>")
}

/// `text` is embedded verbatim, including the empty string.
#[must_use]
pub fn echo_name(text: &str) -> String {
    format!("Your name is {text}")
}

/// The request sent to the approver's DM.
///
/// Both buttons carry `requester_id` as their value; that value is the only
/// link from a later click back to the requester.
#[must_use]
pub fn approval_request(approver_id: &str, requester_id: &str, body: &str) -> OutboundMessage {
    OutboundMessage {
        channel: approver_id.to_string(),
        text: format!("Approval request from <@{requester_id}>: {body}"),
        blocks: Some(approval_request_blocks(requester_id, body)),
    }
}

#[must_use]
pub fn approval_request_blocks(requester_id: &str, body: &str) -> Value {
    json!([
        {
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": format!("*Approval Request from <@{requester_id}>*\n\n{body}")
            }
        },
        {
            "type": "actions",
            "block_id": APPROVAL_ACTIONS_BLOCK_ID,
            "elements": [
                decision_button(Decision::Approved, requester_id),
                decision_button(Decision::Rejected, requester_id),
            ]
        }
    ])
}

fn decision_button(decision: Decision, requester_id: &str) -> Value {
    let (label, style) = match decision {
        Decision::Approved => ("Approve", "primary"),
        Decision::Rejected => ("Reject", "danger"),
    };
    json!({
        "type": "button",
        "text": { "type": "plain_text", "text": label },
        "style": style,
        "value": requester_id,
        "action_id": decision.action_id()
    })
}

/// The DM telling the requester what happened.
#[must_use]
pub fn decision_notice(requester_id: &str, decision: Decision, decided_by: &str) -> OutboundMessage {
    OutboundMessage::text(
        requester_id,
        format!(
            "Your approval request has been *{}* by <@{decided_by}>.",
            decision.verb()
        ),
    )
}
