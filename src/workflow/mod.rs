//! Command routing and the approval workflow.
//!
//! Handlers here run in phase two: the dispatcher has already acknowledged
//! the event before any of them is called.

pub mod approval;
pub mod commands;
pub mod ledger;
pub mod state;

use ledger::DecisionLedger;

use crate::slack::ChatPlatform;

pub use commands::CommandKind;
pub use state::{ApprovalStage, ApprovalTicket, Decision};

/// The bot's event handlers over some chat platform.
pub struct ApprovalBot<P> {
    platform: P,
    ledger: Option<DecisionLedger>,
}

impl<P: ChatPlatform> ApprovalBot<P> {
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self {
            platform,
            ledger: None,
        }
    }

    /// Suppress repeated decisions on the same request message.
    #[must_use]
    pub fn with_decision_dedupe(mut self) -> Self {
        self.ledger = Some(DecisionLedger::new());
        self
    }
}
