//! Database module
//!
//! Database connectivity and schema checks.

use sqlx::PgPool;

/// Tables the checkout writes to
const REQUIRED_TABLES: &[&str] = &["organizations", "users"];

/// Verify database connectivity
pub async fn verify_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    Ok(())
}

/// Check if required tables exist
pub async fn check_schema(pool: &PgPool) -> Result<bool, sqlx::Error> {
    for table in REQUIRED_TABLES {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = 'public' AND table_name = $1
            )
            "#,
        )
        .bind(*table)
        .fetch_one(pool)
        .await?;

        if !exists {
            tracing::error!("Required table '{}' does not exist", table);
            return Ok(false);
        }
    }

    if !has_unique_organization_name(pool).await? {
        tracing::warn!(
            "No unique index on organizations(name); concurrent signups may create duplicates"
        );
    }

    Ok(true)
}

/// Whether organizations(name) is covered by a single-column unique index
async fn has_unique_organization_name(pool: &PgPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM pg_index i
            JOIN pg_class t ON t.oid = i.indrelid
            JOIN pg_namespace n ON n.oid = t.relnamespace
            JOIN pg_attribute a ON a.attrelid = t.oid AND a.attnum = i.indkey[0]
            WHERE n.nspname = 'public'
              AND t.relname = 'organizations'
              AND i.indisunique
              AND i.indnatts = 1
              AND a.attname = 'name'
        )
        "#,
    )
    .fetch_one(pool)
    .await
}
