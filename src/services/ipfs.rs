use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::config::IpfsConfig;
use crate::errors::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub hash: String,
    pub cumulative_size: u64,
}

#[derive(Error, Debug)]
pub enum StatError {
    #[error("object {0} not found")]
    NotFound(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("ipfs api returned {status}: {message}")]
    Status { status: StatusCode, message: String },
}

/// Resolves the stored size of a content hash.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentSizeLookup: Send + Sync {
    async fn stat(&self, hash: &str) -> std::result::Result<ObjectStat, StatError>;
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StatResponse {
    hash: String,
    cumulative_size: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ApiErrorResponse {
    message: String,
}

pub struct IpfsClient {
    client: Client,
    api_url: String,
}

impl IpfsClient {
    pub fn new(config: &IpfsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build ipfs client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ContentSizeLookup for IpfsClient {
    async fn stat(&self, hash: &str) -> std::result::Result<ObjectStat, StatError> {
        let url = format!("{}/api/v0/object/stat", self.api_url);
        let response = self
            .client
            .post(&url)
            .query(&[("arg", hash)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StatError::NotFound(hash.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await?;
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(error) => error.message,
                Err(_) => {
                    tracing::warn!("Unparseable ipfs error body for {}: {}", hash, body);
                    body
                }
            };

            if message.contains("not found") {
                return Err(StatError::NotFound(hash.to_string()));
            }
            return Err(StatError::Status { status, message });
        }

        let stat: StatResponse = response.json().await?;
        tracing::debug!("Object {} is {} bytes", stat.hash, stat.cumulative_size);

        Ok(ObjectStat {
            hash: stat.hash,
            cumulative_size: stat.cumulative_size,
        })
    }
}
