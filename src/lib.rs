/// approval-bot - A Slack bot with greeting commands and a two-step approval workflow.
///
/// The bot answers three slash commands:
/// 1. `/hello` greets the caller
/// 2. `/echo-name <text>` echoes the text back
/// 3. `/start-approval` opens a modal; submitting it DMs the chosen approver
///    an Approve/Reject message, and the click is reported back to the requester
///
/// # Architecture
///
/// The system uses:
/// - slack-morphism for Socket Mode and the Slack Web API
/// - axum for the optional signed-HTTP transport
/// - A tokio dispatcher loop that acknowledges every event before handling it
///
/// # Example
///
/// ```no_run
/// use approval_bot::core::config::AppConfig;
/// use approval_bot::dispatcher::{self, DEFAULT_CHANNEL_CAPACITY};
/// use approval_bot::slack::SlackClient;
/// use approval_bot::workflow::ApprovalBot;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     approval_bot::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let client = SlackClient::new(config.slack_bot_token.clone())?;
///     let (events, dispatcher) = dispatcher::channel(
///         ApprovalBot::new(client),
///         DEFAULT_CHANNEL_CAPACITY,
///         config.ack_timeout,
///     );
///
///     let dispatch = tokio::spawn(dispatcher.run());
///     // Hand `events` to a transport, then:
///     drop(events);
///     dispatch.await?;
///     Ok(())
/// }
/// ```
// Module declarations
pub mod api;
pub mod core;
pub mod dispatcher;
pub mod errors;
pub mod slack;
pub mod workflow;

pub use errors::BotError;

/// Configure structured logging: JSON lines on stderr.
///
/// The level comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// approval_bot::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
