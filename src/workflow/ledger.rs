//! Opt-in memory of decisions already delivered.
//!
//! Off by default: a second click on the same request message sends a second
//! notification. With the ledger on, only the first click per message counts.
//! A click claims its message before the notice is posted and gives the
//! claim back if posting fails, so a later click can retry.
//! The ledger lives in process memory, grows for the life of the process and
//! is lost on restart.

use std::collections::HashSet;
use std::sync::Mutex;

use crate::core::models::ActionClick;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionKey {
    pub channel_id: String,
    pub message_ts: String,
    pub requester_id: String,
}

impl DecisionKey {
    /// `None` when the click does not say which message it came from.
    #[must_use]
    pub fn from_click(click: &ActionClick) -> Option<Self> {
        Some(Self {
            channel_id: click.channel_id.clone()?,
            message_ts: click.message_ts.clone()?,
            requester_id: click.value.clone(),
        })
    }
}

#[derive(Debug, Default)]
pub struct DecisionLedger {
    decided: Mutex<HashSet<DecisionKey>>,
}

impl DecisionLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key`; returns `false` if it was already recorded.
    pub fn record(&self, key: DecisionKey) -> bool {
        match self.decided.lock() {
            Ok(mut set) => set.insert(key),
            Err(poisoned) => poisoned.into_inner().insert(key),
        }
    }

    /// Forget `key` so the next click on its message is handled.
    pub fn release(&self, key: &DecisionKey) {
        match self.decided.lock() {
            Ok(mut set) => set.remove(key),
            Err(poisoned) => poisoned.into_inner().remove(key),
        };
    }
}
