//! All Slack-specific functionality

pub mod client;
pub mod message_builder;
pub mod modal_builder;
pub mod platform;
pub mod socket;

// Re-export main types for convenience
pub use client::SlackClient;
pub use platform::ChatPlatform;
