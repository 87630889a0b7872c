//! Inbound request handling shared by both transports

pub mod handler;
pub mod helpers;
pub mod parsing;
pub mod signature;

use tracing::info;

use crate::dispatcher::EventSender;
use crate::errors::BotError;
use parsing::Interaction;

// Re-export the HTTP router for convenience
pub use handler::{HttpState, router, serve};

/// Hand a parsed interaction to the dispatcher and wait for its ack.
///
/// # Errors
///
/// Returns the dispatcher's delivery error for the first event that fails.
pub async fn deliver_interaction(
    events: &EventSender,
    interaction: Interaction,
) -> Result<(), BotError> {
    match interaction {
        Interaction::Submission(submission) => events.deliver(submission).await,
        Interaction::Actions(clicks) => {
            for click in clicks {
                events.deliver(click).await?;
            }
            Ok(())
        }
        Interaction::Unsupported(kind) => {
            info!("Unhandled interactive type: {}", kind);
            Ok(())
        }
    }
}
