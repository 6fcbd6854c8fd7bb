use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service level a user is billed at.
///
/// Tiers the platform adds later decode into `Other` instead of failing the
/// whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Tier {
    Free,
    Light,
    Plus,
    Paid,
    Other(String),
}

impl Tier {
    pub fn as_str(&self) -> &str {
        match self {
            Tier::Free => "free",
            Tier::Light => "light",
            Tier::Plus => "plus",
            Tier::Paid => "paid",
            Tier::Other(name) => name,
        }
    }
}

impl From<&str> for Tier {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Tier::Free,
            "light" => Tier::Light,
            "plus" => Tier::Plus,
            "paid" => Tier::Paid,
            other => Tier::Other(other.to_string()),
        }
    }
}

impl From<String> for Tier {
    fn from(value: String) -> Self {
        Tier::from(value.as_str())
    }
}

impl From<Tier> for String {
    fn from(tier: Tier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub username: String,
    pub tier: Tier,
    pub updated_at: DateTime<Utc>,
}
