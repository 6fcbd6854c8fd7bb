use async_trait::async_trait;
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
    PgPool,
};

use crate::config::DatabaseConfig;
use crate::errors::Result;
use crate::models::{Upload, Usage, User};

pub mod memory;
pub mod queries;

use queries::{UploadQueries, UsageQueries, UserQueries};

/// Read-only view of the platform tables. Every call returns the whole
/// table in creation order.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn users(&self) -> Result<Vec<User>>;

    async fn usages(&self) -> Result<Vec<Usage>>;

    async fn uploads(&self) -> Result<Vec<Upload>>;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let ssl_mode = if config.ssl_mode_disable {
            PgSslMode::Disable
        } else {
            PgSslMode::Prefer
        };
        let options = config.url.parse::<PgConnectOptions>()?.ssl_mode(ssl_mode);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SnapshotProvider for Database {
    async fn users(&self) -> Result<Vec<User>> {
        UserQueries::all(&self.pool).await
    }

    async fn usages(&self) -> Result<Vec<Usage>> {
        UsageQueries::all(&self.pool).await
    }

    async fn uploads(&self) -> Result<Vec<Upload>> {
        UploadQueries::all(&self.pool).await
    }
}
