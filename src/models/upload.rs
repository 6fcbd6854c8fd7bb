use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// A pin of some content by one owner. The same hash shows up once per
/// owner (or re-pin), so `hash` is not a key.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Upload {
    pub hash: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// One record per distinct content hash.
    Unique,
    All,
}

impl UploadMode {
    pub fn from_unique(unique: bool) -> Self {
        if unique {
            UploadMode::Unique
        } else {
            UploadMode::All
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Unique => f.write_str("unique"),
            UploadMode::All => f.write_str("non unique"),
        }
    }
}
