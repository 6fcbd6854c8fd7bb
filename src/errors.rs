use thiserror::Error;

use crate::services::ipfs::StatError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("usage record references unknown user {username}")]
    ReferentialIntegrity { username: String },

    #[error("size lookup failed for {hash}: {source}")]
    SizeLookup {
        hash: String,
        #[source]
        source: StatError,
    },

    #[error("cannot average over an empty upload set")]
    EmptySet,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<::config::ConfigError> for AppError {
    fn from(err: ::config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
