//! The approval workflow as an explicit state machine.
//!
//! Nothing here is stored between events. Each handler rebuilds the ticket
//! from what Slack hands back (the submitting user, or a button value) and
//! advances it, so an out-of-order step fails loudly instead of silently.

use std::fmt;

use crate::errors::BotError;
use crate::slack::message_builder::{APPROVE_ACTION_ID, REJECT_ACTION_ID};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    /// Map a button `action_id` to a decision; other actions are not decisions.
    #[must_use]
    pub fn from_action_id(action_id: &str) -> Option<Self> {
        match action_id {
            APPROVE_ACTION_ID => Some(Self::Approved),
            REJECT_ACTION_ID => Some(Self::Rejected),
            _ => None,
        }
    }

    #[must_use]
    pub fn action_id(self) -> &'static str {
        match self {
            Self::Approved => APPROVE_ACTION_ID,
            Self::Rejected => REJECT_ACTION_ID,
        }
    }

    #[must_use]
    pub fn verb(self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalStage {
    Idle,
    FormRequested,
    FormSubmitted,
    AwaitingDecision,
    Decided(Decision),
}

impl fmt::Display for ApprovalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::FormRequested => f.write_str("form requested"),
            Self::FormSubmitted => f.write_str("form submitted"),
            Self::AwaitingDecision => f.write_str("awaiting decision"),
            Self::Decided(d) => write!(f, "decided ({})", d.verb()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalTicket {
    stage: ApprovalStage,
    requester_id: String,
    approver_id: Option<String>,
}

impl ApprovalTicket {
    #[must_use]
    pub fn new(requester_id: impl Into<String>) -> Self {
        Self {
            stage: ApprovalStage::Idle,
            requester_id: requester_id.into(),
            approver_id: None,
        }
    }

    /// A ticket whose form is open on the platform; used when a submission arrives.
    #[must_use]
    pub fn with_open_form(requester_id: impl Into<String>) -> Self {
        Self {
            stage: ApprovalStage::FormRequested,
            ..Self::new(requester_id)
        }
    }

    /// Rebuild a ticket from the correlation value on a clicked button.
    #[must_use]
    pub fn from_correlation(value: &str) -> Self {
        Self {
            stage: ApprovalStage::AwaitingDecision,
            ..Self::new(value)
        }
    }

    #[must_use]
    pub fn stage(&self) -> ApprovalStage {
        self.stage
    }

    #[must_use]
    pub fn requester_id(&self) -> &str {
        &self.requester_id
    }

    #[must_use]
    pub fn approver_id(&self) -> Option<&str> {
        self.approver_id.as_deref()
    }

    /// The value attached to both decision buttons.
    #[must_use]
    pub fn correlation_value(&self) -> &str {
        &self.requester_id
    }

    /// `Idle -> FormRequested`
    ///
    /// # Errors
    ///
    /// Returns `BotError::WorkflowError` from any other stage.
    pub fn request_form(self) -> Result<Self, BotError> {
        self.advance(ApprovalStage::Idle, "request form", ApprovalStage::FormRequested)
    }

    /// `FormRequested -> FormSubmitted`, recording the chosen approver.
    ///
    /// # Errors
    ///
    /// Returns `BotError::WorkflowError` from any other stage.
    pub fn submit(self, approver_id: impl Into<String>) -> Result<Self, BotError> {
        let mut next = self.advance(
            ApprovalStage::FormRequested,
            "submit form",
            ApprovalStage::FormSubmitted,
        )?;
        next.approver_id = Some(approver_id.into());
        Ok(next)
    }

    /// `FormSubmitted -> AwaitingDecision`, once the request reached the approver.
    ///
    /// # Errors
    ///
    /// Returns `BotError::WorkflowError` from any other stage.
    pub fn await_decision(self) -> Result<Self, BotError> {
        self.advance(
            ApprovalStage::FormSubmitted,
            "send request",
            ApprovalStage::AwaitingDecision,
        )
    }

    /// `AwaitingDecision -> Decided`
    ///
    /// # Errors
    ///
    /// Returns `BotError::WorkflowError` from any other stage.
    pub fn decide(self, decision: Decision) -> Result<Self, BotError> {
        self.advance(
            ApprovalStage::AwaitingDecision,
            "decide",
            ApprovalStage::Decided(decision),
        )
    }

    fn advance(
        mut self,
        expected: ApprovalStage,
        step: &str,
        next: ApprovalStage,
    ) -> Result<Self, BotError> {
        if self.stage != expected {
            return Err(BotError::WorkflowError(format!(
                "cannot {step} while {} (requester {})",
                self.stage, self.requester_id
            )));
        }
        self.stage = next;
        Ok(self)
    }
}
