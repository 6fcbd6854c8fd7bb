use ::config::{Environment, File};
use serde::Deserialize;
use std::env;

use crate::errors::Result;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub ipfs: IpfsConfig,
    pub sendgrid: SendgridConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub ssl_mode_disable: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IpfsConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Upper bound on in-flight `object/stat` calls.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SendgridConfig {
    pub api_url: String,
    pub api_key: String,
    pub from_email: String,
    pub from_name: String,
    pub timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/temporal".to_string(),
            max_connections: 5,
            ssl_mode_disable: false,
        }
    }
}

impl Default for IpfsConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5001".to_string(),
            timeout_secs: 60,
            concurrency: 8,
        }
    }
}

impl Default for SendgridConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.sendgrid.com/v3/mail/send".to_string(),
            api_key: String::new(),
            from_email: String::new(),
            from_name: "Temporal Farmer".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Layers, lowest to highest: built-in defaults, `DATABASE_URL`, the
    /// optional config file, then `TFARMER__SECTION__KEY` variables.
    pub fn load(path: Option<&str>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = ::config::Config::builder();

        if let Ok(url) = env::var("DATABASE_URL") {
            builder = builder.set_default("database.url", url)?;
        }

        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix("TFARMER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        tracing::debug!(
            ipfs = %config.ipfs.api_url,
            concurrency = config.ipfs.concurrency,
            "configuration loaded"
        );

        Ok(config)
    }
}
