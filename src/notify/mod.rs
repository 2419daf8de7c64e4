//! Welcome notifications
//!
//! A [`Notifier`] delivers the welcome message on one channel. [`FanoutNotifier`]
//! drives every configured channel for a signup.

mod email;
mod whatsapp;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use email::EmailNotifier;
pub use whatsapp::WhatsAppNotifier;

/// Notification delivery errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Email delivery failed: {0}")]
    Email(String),

    #[error("WhatsApp delivery failed: {0}")]
    WhatsApp(String),

    #[error("Notification timed out after {0:?}")]
    Timeout(Duration),

    #[error("{} channels failed: {}", .0.len(), join_errors(.0))]
    Several(Vec<NotifyError>),
}

fn join_errors(errors: &[NotifyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// What a new administrator is told after signing up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WelcomeMessage {
    pub recipient_name: String,
    pub email: String,
    /// Phone number as typed in the form
    pub phone: String,
    pub organization: String,
}

/// One delivery channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs
    fn channel(&self) -> &'static str;

    async fn send_welcome(&self, message: &WelcomeMessage) -> Result<(), NotifyError>;
}

/// Sends through every channel, even after one of them failed
#[derive(Default, Clone)]
pub struct FanoutNotifier {
    channels: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for FanoutNotifier {
    fn channel(&self) -> &'static str {
        "fanout"
    }

    async fn send_welcome(&self, message: &WelcomeMessage) -> Result<(), NotifyError> {
        let mut failures = Vec::new();

        for channel in &self.channels {
            match channel.send_welcome(message).await {
                Ok(()) => {
                    tracing::info!(channel = channel.channel(), "Welcome notification sent");
                }
                Err(e) => {
                    tracing::warn!(channel = channel.channel(), error = %e, "Welcome notification failed");
                    failures.push(e);
                }
            }
        }

        match failures.len() {
            0 => Ok(()),
            1 => Err(failures.remove(0)),
            _ => Err(NotifyError::Several(failures)),
        }
    }
}
