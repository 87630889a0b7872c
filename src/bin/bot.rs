use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use approval_bot::api::{self, HttpState};
use approval_bot::core::config::{AppConfig, Transport};
use approval_bot::dispatcher::{self, DEFAULT_CHANNEL_CAPACITY};
use approval_bot::slack::{SlackClient, socket};
use approval_bot::workflow::ApprovalBot;
use tracing::{error, info};

const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    approval_bot::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        e
    })?;

    let client = SlackClient::new(config.slack_bot_token.clone())?;
    let hyper_client = client.hyper_client();

    let mut bot = ApprovalBot::new(client);
    if config.dedupe_decisions {
        info!("Repeated approval decisions will be suppressed");
        bot = bot.with_decision_dedupe();
    }

    let (events, dispatcher) =
        dispatcher::channel(bot, DEFAULT_CHANNEL_CAPACITY, config.ack_timeout);
    let dispatch = tokio::spawn(dispatcher.run());

    match config.transport {
        Transport::Socket => {
            let app_token = config
                .slack_app_token
                .as_deref()
                .context("SLACK_APP_TOKEN is required for socket transport")?;
            socket::serve(hyper_client, app_token, events, shutdown_signal()).await?;
        }
        Transport::Http => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
            let state = HttpState::new(events, &config.slack_signing_secret);
            api::serve(addr, state, shutdown_signal()).await?;
        }
    }

    // Transports dropped their senders; wait for in-flight handlers.
    match tokio::time::timeout(DRAIN_TIMEOUT, dispatch).await {
        Ok(joined) => joined.context("dispatcher task failed")?,
        Err(_) => error!("In-flight handlers still running after {:?}, exiting", DRAIN_TIMEOUT),
    }
    info!("Bot stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
