use serde_json::{Value, json};

use crate::core::models::ApprovalForm;
use crate::errors::BotError;

pub const APPROVAL_MODAL_CALLBACK_ID: &str = "approval_request_modal";
pub const APPROVER_BLOCK_ID: &str = "approver_block";
pub const APPROVER_ACTION_ID: &str = "approver";
pub const APPROVAL_TEXT_BLOCK_ID: &str = "approval_text_block";
pub const APPROVAL_TEXT_ACTION_ID: &str = "approval_text";

/// Build the "Request Approval" modal.
///
/// Two required inputs: a `users_select` for the approver and a multiline
/// `plain_text_input` for the request body.
#[must_use]
pub fn build_approval_modal() -> Value {
    let blocks = vec![
        json!({
            "type": "input",
            "block_id": APPROVER_BLOCK_ID,
            "label": { "type": "plain_text", "text": "Select Approver" },
            "element": { "type": "users_select", "action_id": APPROVER_ACTION_ID }
        }),
        json!({
            "type": "input",
            "block_id": APPROVAL_TEXT_BLOCK_ID,
            "label": { "type": "plain_text", "text": "Approval Text" },
            "element": {
                "type": "plain_text_input",
                "action_id": APPROVAL_TEXT_ACTION_ID,
                "multiline": true
            }
        }),
    ];

    json!({
        "type": "modal",
        "callback_id": APPROVAL_MODAL_CALLBACK_ID,
        "title": { "type": "plain_text", "text": "Request Approval" },
        "submit": { "type": "plain_text", "text": "Submit" },
        "blocks": blocks
    })
}

/// Read the approver and body out of `view.state.values`.
///
/// A missing approver is a malformed submission. A missing or null text value
/// is read as the empty string.
///
/// # Errors
///
/// Returns `BotError::ParseError` if no approver was selected.
pub fn extract_approval_form(values: &Value) -> Result<ApprovalForm, BotError> {
    let approver_id = values
        .get(APPROVER_BLOCK_ID)
        .and_then(|b| b.get(APPROVER_ACTION_ID))
        .and_then(|a| a.get("selected_user"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            BotError::ParseError(format!(
                "{APPROVER_BLOCK_ID}.{APPROVER_ACTION_ID}.selected_user missing"
            ))
        })?;

    let body = values
        .get(APPROVAL_TEXT_BLOCK_ID)
        .and_then(|b| b.get(APPROVAL_TEXT_ACTION_ID))
        .and_then(|a| a.get("value"))
        .and_then(Value::as_str)
        .unwrap_or("");

    Ok(ApprovalForm {
        approver_id: approver_id.to_string(),
        body: body.to_string(),
    })
}
