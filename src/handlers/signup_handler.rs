//! Signup Handler
//!
//! Handles the checkout: validate, check the organization name, hash the password,
//! write organization + administrator, then send the welcome notification.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::config::{Config, NotifyMode};
use crate::domain::{CreatedSignup, OperationContext, PasswordHasher, SignupError};
use crate::notify::{Notifier, NotifyError, WelcomeMessage};
use crate::store::{DirectoryStore, StoreError};

use super::SignupCommand;

/// Timeouts and dispatch policy for [`SignupHandler`]
#[derive(Debug, Clone, Copy)]
pub struct SignupSettings {
    pub store_timeout: Duration,
    pub notify_timeout: Duration,
    pub notify_mode: NotifyMode,
}

impl Default for SignupSettings {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(10),
            notify_timeout: Duration::from_secs(15),
            notify_mode: NotifyMode::Background,
        }
    }
}

impl From<&Config> for SignupSettings {
    fn from(config: &Config) -> Self {
        Self {
            store_timeout: config.store_timeout,
            notify_timeout: config.notify_timeout,
            notify_mode: config.notify_mode,
        }
    }
}

/// What happened to the welcome notification
#[derive(Debug)]
pub enum NotificationStatus {
    /// Every channel accepted the message
    Delivered,
    /// Handed to a background task; the outcome is only logged
    Dispatched,
    /// Delivery failed; the signup itself is committed
    Failed(NotifyError),
}

/// Result of a committed signup
#[derive(Debug)]
pub struct SignupOutcome {
    pub created: CreatedSignup,
    pub notification: NotificationStatus,
}

/// Handler for organization signup
pub struct SignupHandler {
    store: Arc<dyn DirectoryStore>,
    hasher: Arc<dyn PasswordHasher>,
    notifier: Arc<dyn Notifier>,
    settings: SignupSettings,
}

impl SignupHandler {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        hasher: Arc<dyn PasswordHasher>,
        notifier: Arc<dyn Notifier>,
        settings: SignupSettings,
    ) -> Self {
        Self {
            store,
            hasher,
            notifier,
            settings,
        }
    }

    /// Execute the signup command
    #[tracing::instrument(
        name = "signup",
        skip_all,
        fields(organization = %command.company, correlation_id = ?context.correlation_id)
    )]
    pub async fn execute(
        &self,
        command: SignupCommand,
        context: &OperationContext,
    ) -> Result<SignupOutcome, SignupError> {
        command.validate()?;

        // Fast path only; the unique index decides under concurrency
        let exists = self
            .with_store_timeout(self.store.organization_exists(&command.company))
            .await?;
        if exists {
            tracing::info!("Organization name already registered");
            return Err(SignupError::conflict(command.company.as_str()));
        }

        let password_hash = self.hash_password(command.password.clone()).await?;

        let created = self
            .with_store_timeout(
                self.store
                    .create_organization_with_admin(
                        command.organization(),
                        command.administrator(password_hash),
                    ),
            )
            .await?;

        tracing::info!(
            organization_id = %created.organization_id,
            user_id = %created.user_id,
            "Organization and administrator created"
        );

        let notification = self.notify(command.welcome_message()).await;

        Ok(SignupOutcome {
            created,
            notification,
        })
    }

    async fn with_store_timeout<T, F>(&self, call: F) -> Result<T, SignupError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.settings.store_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => {
                tracing::error!(timeout = ?self.settings.store_timeout, "Directory store call timed out");
                Err(StoreError::Timeout.into())
            }
        }
    }

    /// bcrypt is CPU bound; keep it off the async workers
    async fn hash_password(&self, password: String) -> Result<String, SignupError> {
        let hasher = Arc::clone(&self.hasher);

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| SignupError::CredentialHashing(e.to_string()))?
            .map_err(|e| SignupError::CredentialHashing(e.to_string()))
    }

    async fn notify(&self, message: WelcomeMessage) -> NotificationStatus {
        let notifier = Arc::clone(&self.notifier);
        let timeout = self.settings.notify_timeout;

        match self.settings.notify_mode {
            NotifyMode::Background => {
                tokio::spawn(
                    deliver(notifier, message, timeout).instrument(tracing::Span::current()),
                );
                NotificationStatus::Dispatched
            }
            NotifyMode::Await => match deliver(notifier, message, timeout).await {
                Ok(()) => NotificationStatus::Delivered,
                Err(e) => NotificationStatus::Failed(e),
            },
        }
    }
}

async fn deliver(
    notifier: Arc<dyn Notifier>,
    message: WelcomeMessage,
    timeout: Duration,
) -> Result<(), NotifyError> {
    let result = match tokio::time::timeout(timeout, notifier.send_welcome(&message)).await {
        Ok(result) => result,
        Err(_) => Err(NotifyError::Timeout(timeout)),
    };

    if let Err(e) = &result {
        tracing::warn!(error = %e, "Welcome notification not delivered");
    }

    result
}
