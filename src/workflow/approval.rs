use tracing::{info, warn};

use super::ApprovalBot;
use super::ledger::DecisionKey;
use super::state::{ApprovalTicket, Decision};
use crate::core::models::{ActionClick, FormSubmission};
use crate::errors::BotError;
use crate::slack::ChatPlatform;
use crate::slack::message_builder::{approval_request, decision_notice};
use crate::slack::modal_builder::{APPROVAL_MODAL_CALLBACK_ID, extract_approval_form};

impl<P: ChatPlatform> ApprovalBot<P> {
    /// Send a submitted approval form to the chosen approver.
    ///
    /// Submissions of other modals are ignored.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ParseError` for a submission without an approver, or
    /// the platform error if the request cannot be posted.
    pub async fn handle_submission(&self, submission: &FormSubmission) -> Result<(), BotError> {
        if submission.callback_id != APPROVAL_MODAL_CALLBACK_ID {
            info!(callback_id = %submission.callback_id, "Unhandled view submission");
            return Ok(());
        }

        let form = extract_approval_form(&submission.values)?;
        let ticket =
            ApprovalTicket::with_open_form(&submission.submitter_id).submit(&form.approver_id)?;

        let message = approval_request(&form.approver_id, ticket.correlation_value(), &form.body);
        let delivery = self.platform.post_message(&message).await.map_err(|e| {
            BotError::ApiError(format!("Error sending approval request: {e}"))
        })?;

        let ticket = ticket.await_decision()?;
        info!(
            requester_id = %ticket.requester_id(),
            approver_id = %form.approver_id,
            ts = %delivery.ts,
            "Approval request delivered"
        );
        Ok(())
    }

    /// Notify the requester of an approve/reject click.
    ///
    /// Other action IDs are ignored.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the notification cannot be posted.
    pub async fn handle_action(&self, click: &ActionClick) -> Result<(), BotError> {
        let Some(decision) = Decision::from_action_id(&click.action_id) else {
            info!(action_id = %click.action_id, "Unhandled block action");
            return Ok(());
        };

        let ticket = ApprovalTicket::from_correlation(&click.value).decide(decision)?;
        let notice = decision_notice(ticket.requester_id(), decision, &click.clicker_id);

        let claimed = self.ledger.as_ref().zip(DecisionKey::from_click(click));
        if let Some((ledger, key)) = &claimed
            && !ledger.record(key.clone())
        {
            warn!(
                requester_id = %click.value,
                clicker_id = %click.clicker_id,
                "Decision already recorded for this request, skipping notification"
            );
            return Ok(());
        }

        if let Err(e) = self.platform.post_message(&notice).await {
            // The requester was never told, so a later click may try again.
            if let Some((ledger, key)) = claimed {
                ledger.release(&key);
            }
            return Err(e);
        }

        info!(
            requester_id = %ticket.requester_id(),
            decided_by = %click.clicker_id,
            decision = decision.verb(),
            "Decision delivered"
        );
        Ok(())
    }
}
