use tracing::{info, warn};

use super::ApprovalBot;
use super::state::ApprovalTicket;
use crate::core::models::{OutboundMessage, SlashCommand};
use crate::errors::BotError;
use crate::slack::ChatPlatform;
use crate::slack::message_builder::{echo_name, greeting};
use crate::slack::modal_builder::build_approval_modal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Hello,
    EchoName,
    StartApproval,
}

impl CommandKind {
    /// Resolve a command name, with or without its leading slash.
    ///
    /// `say_name` and `approval-test` are the names the app was first
    /// registered under and stay routable.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.strip_prefix('/').unwrap_or(name) {
            "hello" => Some(Self::Hello),
            "echo-name" | "say_name" => Some(Self::EchoName),
            "start-approval" | "approval-test" => Some(Self::StartApproval),
            _ => None,
        }
    }
}

impl<P: ChatPlatform> ApprovalBot<P> {
    /// Route an acknowledged slash command to its behavior.
    ///
    /// # Errors
    ///
    /// Returns the platform error if the reply or `views.open` call fails.
    pub async fn handle_command(&self, command: &SlashCommand) -> Result<(), BotError> {
        let Some(kind) = CommandKind::from_name(&command.command) else {
            warn!(command = %command.command, "Unknown slash command, ignoring");
            return Ok(());
        };

        info!(?kind, user_id = %command.user_id, "Handling slash command");

        match kind {
            CommandKind::Hello => {
                let reply = OutboundMessage::text(&command.channel_id, greeting(&command.user_id));
                self.platform.post_message(&reply).await.map(|_| ())
            }
            CommandKind::EchoName => {
                let reply = OutboundMessage::text(&command.channel_id, echo_name(&command.text));
                self.platform.post_message(&reply).await.map(|_| ())
            }
            CommandKind::StartApproval => self.start_approval(command).await,
        }
    }

    async fn start_approval(&self, command: &SlashCommand) -> Result<(), BotError> {
        let ticket = ApprovalTicket::new(&command.user_id).request_form()?;
        self.platform
            .open_view(&command.trigger_id, &build_approval_modal())
            .await
            .map_err(|e| {
                BotError::ApiError(format!(
                    "Error opening approval modal for {}: {e}",
                    ticket.requester_id()
                ))
            })
    }
}
