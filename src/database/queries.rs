use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::errors::Result;
use crate::models::*;

pub struct UserQueries;

impl UserQueries {
    pub async fn all(pool: &PgPool) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_name AS username, email_address AS email, created_at, updated_at
            FROM users
            WHERE deleted_at IS NULL
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        tracing::debug!(count = users.len(), "loaded user snapshot");
        Ok(users)
    }
}

#[derive(FromRow)]
struct UsageRow {
    username: String,
    tier: String,
    updated_at: DateTime<Utc>,
}

impl From<UsageRow> for Usage {
    fn from(row: UsageRow) -> Self {
        Usage {
            username: row.username,
            tier: Tier::from(row.tier),
            updated_at: row.updated_at,
        }
    }
}

pub struct UsageQueries;

impl UsageQueries {
    pub async fn all(pool: &PgPool) -> Result<Vec<Usage>> {
        let rows = sqlx::query_as::<_, UsageRow>(
            r#"
            SELECT user_name AS username, tier, updated_at
            FROM usages
            WHERE deleted_at IS NULL
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        tracing::debug!(count = rows.len(), "loaded usage snapshot");
        Ok(rows.into_iter().map(Usage::from).collect())
    }
}

pub struct UploadQueries;

impl UploadQueries {
    pub async fn all(pool: &PgPool) -> Result<Vec<Upload>> {
        let uploads = sqlx::query_as::<_, Upload>(
            r#"
            SELECT hash, user_name AS username, created_at
            FROM uploads
            WHERE deleted_at IS NULL
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(pool)
        .await?;

        tracing::debug!(count = uploads.len(), "loaded upload snapshot");
        Ok(uploads)
    }
}
