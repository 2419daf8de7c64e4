//! Signup Error Types
//!
//! One variant per failure source of the checkout flow. The HTTP layer picks the
//! response from the variant, never from the message text.

use thiserror::Error;

use crate::notify::NotifyError;
use crate::store::StoreError;

/// Failure of a signup attempt
#[derive(Debug, Error)]
pub enum SignupError {
    /// Payload passed the shape check but breaks a signup rule
    #[error("{reason}")]
    ValidationFailed { field: &'static str, reason: String },

    /// An organization with this name is already registered
    #[error("Organization already registered: {organization}")]
    ConflictDetected { organization: String },

    /// Directory store failed, timed out or returned an unexpected result
    #[error("Directory store unavailable: {source}")]
    StoreUnavailable {
        #[source]
        source: StoreError,
    },

    /// Account exists but the welcome message could not be delivered
    #[error("Welcome notification failed: {0}")]
    NotifyFailed(#[from] NotifyError),

    /// Password could not be hashed
    #[error("Credential hashing failed: {0}")]
    CredentialHashing(String),
}

impl SignupError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field,
            reason: reason.into(),
        }
    }

    pub fn conflict(organization: impl Into<String>) -> Self {
        Self::ConflictDetected {
            organization: organization.into(),
        }
    }
}

impl From<StoreError> for SignupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { organization } => Self::ConflictDetected { organization },
            other => Self::StoreUnavailable { source: other },
        }
    }
}
