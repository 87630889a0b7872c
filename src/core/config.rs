use std::env;
use std::time::Duration;

use crate::errors::BotError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 2500;

/// How inbound Slack events reach the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Outbound WebSocket opened with the app-level token.
    #[default]
    Socket,
    /// Signed HTTP requests on `port`.
    Http,
}

impl Transport {
    fn parse(raw: &str) -> Result<Self, BotError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "socket" | "socket_mode" => Ok(Self::Socket),
            "http" => Ok(Self::Http),
            other => Err(BotError::ConfigError(format!(
                "SLACK_TRANSPORT: unknown transport '{other}' (expected 'socket' or 'http')"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub slack_bot_token: String,
    pub slack_signing_secret: String,
    pub slack_app_token: Option<String>,
    pub port: u16,
    pub transport: Transport,
    pub ack_timeout: Duration,
    pub dedupe_decisions: bool,
}

impl AppConfig {
    /// Load `.env` if present, then read the process environment.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if a required variable is missing or a
    /// value fails validation.
    pub fn from_env() -> Result<Self, BotError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            return Err(BotError::ConfigError(format!(".env: {e}")));
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a validated config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `BotError::ConfigError` describing the first offending variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, BotError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .ok_or_else(|| BotError::ConfigError(format!("{key}: environment variable not found")))
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| BotError::ConfigError(format!("PORT: {e}")))?,
            None => DEFAULT_PORT,
        };

        let transport = match lookup("SLACK_TRANSPORT") {
            Some(raw) => Transport::parse(&raw)?,
            None => Transport::default(),
        };

        let ack_timeout_ms = match lookup("ACK_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| BotError::ConfigError(format!("ACK_TIMEOUT_MS: {e}")))?,
            None => DEFAULT_ACK_TIMEOUT_MS,
        };

        let dedupe_decisions = match lookup("APPROVAL_DEDUPE_DECISIONS") {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                BotError::ConfigError(format!("APPROVAL_DEDUPE_DECISIONS: not a boolean: '{raw}'"))
            })?,
            None => false,
        };

        let config = Self {
            slack_bot_token: required("SLACK_BOT_TOKEN")?,
            slack_signing_secret: required("SLACK_SIGNING_SECRET")?,
            slack_app_token: lookup("SLACK_APP_TOKEN"),
            port,
            transport,
            ack_timeout: Duration::from_millis(ack_timeout_ms),
            dedupe_decisions,
        };
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `BotError::ConfigError` if a token is blank, the app token is
    /// missing or malformed in socket mode, or the ack timeout is zero.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.slack_bot_token.trim().is_empty() {
            return Err(BotError::ConfigError("SLACK_BOT_TOKEN is empty".to_string()));
        }
        if self.slack_signing_secret.trim().is_empty() {
            return Err(BotError::ConfigError(
                "SLACK_SIGNING_SECRET is empty".to_string(),
            ));
        }
        if self.transport == Transport::Socket {
            match self.slack_app_token.as_deref() {
                None => {
                    return Err(BotError::ConfigError(
                        "SLACK_APP_TOKEN is required for socket transport".to_string(),
                    ));
                }
                Some(token) if !token.starts_with("xapp-") => {
                    return Err(BotError::ConfigError(
                        "SLACK_APP_TOKEN must be an app-level token (xapp-...)".to_string(),
                    ));
                }
                Some(_) => {}
            }
        }
        if self.ack_timeout.is_zero() {
            return Err(BotError::ConfigError(
                "ACK_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
