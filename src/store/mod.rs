//! Directory Store
//!
//! Persistence of organizations and their administrator users.

mod memory;
mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{CreatedSignup, NewAdministrator, NewOrganization};

pub use memory::{InMemoryDirectoryStore, StoredOrganization, StoredUser};
pub use postgres::PgDirectoryStore;

/// Directory store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation on the organization name
    #[error("Organization name already taken: {organization}")]
    Conflict { organization: String },

    /// Insert completed without returning the generated row
    #[error("Insert into {0} returned no generated id")]
    MissingGeneratedId(&'static str),

    #[error("Directory store call timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Directory store state is poisoned")]
    Poisoned,
}

/// Organization/user directory
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// Whether an organization with exactly this name exists
    async fn organization_exists(&self, name: &str) -> Result<bool, StoreError>;

    /// Insert the organization and its administrator as one atomic unit.
    ///
    /// Either both rows exist afterwards or neither does. A name collision is
    /// reported as [`StoreError::Conflict`].
    async fn create_organization_with_admin(
        &self,
        organization: NewOrganization,
        admin: NewAdministrator,
    ) -> Result<CreatedSignup, StoreError>;
}
