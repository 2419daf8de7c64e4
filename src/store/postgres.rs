//! Postgres-backed directory

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{CreatedSignup, NewAdministrator, NewOrganization};

use super::{DirectoryStore, StoreError};

/// Directory on the hosted Postgres database
#[derive(Debug, Clone)]
pub struct PgDirectoryStore {
    pool: PgPool,
}

impl PgDirectoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-index violation on insert to a name conflict
fn map_insert_error(err: sqlx::Error, organization: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::Conflict {
            organization: organization.to_string(),
        },
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl DirectoryStore for PgDirectoryStore {
    async fn organization_exists(&self, name: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM organizations WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create_organization_with_admin(
        &self,
        organization: NewOrganization,
        admin: NewAdministrator,
    ) -> Result<CreatedSignup, StoreError> {
        // Both rows or neither; dropping the transaction rolls back
        let mut tx = self.pool.begin().await?;

        let organization_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO organizations (name, plano_ativo, metodo_pagto, status_assinatura)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&organization.name)
        .bind(&organization.plan)
        .bind(&organization.payment_method)
        .bind(organization.status.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_insert_error(e, &organization.name))?;

        let organization_id =
            organization_id.ok_or(StoreError::MissingGeneratedId("organizations"))?;

        let user_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO users (username, email, password_hash, org_name, org_id, role, cpf_cnpj, whatsapp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&admin.username)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(&organization.name)
        .bind(organization_id)
        .bind(admin.role().as_str())
        .bind(&admin.tax_id)
        .bind(&admin.phone)
        .fetch_optional(&mut *tx)
        .await?;

        let user_id = user_id.ok_or(StoreError::MissingGeneratedId("users"))?;

        tx.commit().await?;

        tracing::debug!(%organization_id, %user_id, "Organization and administrator inserted");

        Ok(CreatedSignup {
            organization_id,
            user_id,
        })
    }
}
