//! Directory records written by the signup flow

use uuid::Uuid;

/// Access level of a directory user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// First user of an organization; the only role the checkout assigns
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "ADM",
        }
    }
}

/// Subscription state stored on the organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "ativo",
        }
    }
}

/// Organization row to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrganization {
    /// Natural key, unique across the directory
    pub name: String,
    pub plan: String,
    pub payment_method: String,
    pub status: SubscriptionStatus,
}

/// Administrator user to insert alongside a new organization.
///
/// The owning organization's id and name are filled in by the store.
#[derive(Clone, PartialEq, Eq)]
pub struct NewAdministrator {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub tax_id: String,
    pub phone: String,
}

impl NewAdministrator {
    pub fn role(&self) -> Role {
        Role::Administrator
    }
}

impl std::fmt::Debug for NewAdministrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewAdministrator")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("tax_id", &self.tax_id)
            .field("phone", &self.phone)
            .finish()
    }
}

/// Identifiers generated for a completed signup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedSignup {
    pub organization_id: Uuid,
    pub user_id: Uuid,
}
