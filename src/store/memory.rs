//! In-process directory
//!
//! Enforces the same name uniqueness and all-or-nothing insert as the database.
//! Backs the API tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{CreatedSignup, NewAdministrator, NewOrganization, Role, SubscriptionStatus};

use super::{DirectoryStore, StoreError};

#[derive(Debug, Clone)]
pub struct StoredOrganization {
    pub id: Uuid,
    pub name: String,
    pub plan: String,
    pub payment_method: String,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub tax_id: String,
    pub phone: String,
    pub org_id: Uuid,
    pub org_name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    organizations: Vec<StoredOrganization>,
    users: Vec<StoredUser>,
    writes: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryDirectoryStore {
    tables: Mutex<Tables>,
    fail_user_insert: AtomicBool,
}

impl InMemoryDirectoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make user inserts fail once the organization row has been prepared
    pub fn fail_user_insert(&self, fail: bool) {
        self.fail_user_insert.store(fail, Ordering::SeqCst);
    }

    pub fn organizations(&self) -> Vec<StoredOrganization> {
        self.tables
            .lock()
            .map(|t| t.organizations.clone())
            .unwrap_or_default()
    }

    pub fn users(&self) -> Vec<StoredUser> {
        self.tables
            .lock()
            .map(|t| t.users.clone())
            .unwrap_or_default()
    }

    /// Number of committed row inserts
    pub fn write_count(&self) -> usize {
        self.tables.lock().map(|t| t.writes).unwrap_or_default()
    }
}

#[async_trait]
impl DirectoryStore for InMemoryDirectoryStore {
    async fn organization_exists(&self, name: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(tables.organizations.iter().any(|o| o.name == name))
    }

    async fn create_organization_with_admin(
        &self,
        organization: NewOrganization,
        admin: NewAdministrator,
    ) -> Result<CreatedSignup, StoreError> {
        let mut tables = self.tables.lock().map_err(|_| StoreError::Poisoned)?;

        if tables.organizations.iter().any(|o| o.name == organization.name) {
            return Err(StoreError::Conflict {
                organization: organization.name,
            });
        }

        let now = Utc::now();
        let stored_org = StoredOrganization {
            id: Uuid::new_v4(),
            name: organization.name,
            plan: organization.plan,
            payment_method: organization.payment_method,
            status: organization.status,
            created_at: now,
        };

        // Nothing has been applied yet, so failing here leaves no orphan
        if self.fail_user_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::Protocol(
                "simulated users insert failure".to_string(),
            )));
        }

        let stored_user = StoredUser {
            id: Uuid::new_v4(),
            role: admin.role(),
            username: admin.username,
            email: admin.email,
            password_hash: admin.password_hash,
            tax_id: admin.tax_id,
            phone: admin.phone,
            org_id: stored_org.id,
            org_name: stored_org.name.clone(),
            created_at: now,
        };

        let created = CreatedSignup {
            organization_id: stored_org.id,
            user_id: stored_user.id,
        };

        tables.organizations.push(stored_org);
        tables.users.push(stored_user);
        tables.writes += 2;

        Ok(created)
    }
}
