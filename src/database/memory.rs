use async_trait::async_trait;

use crate::database::SnapshotProvider;
use crate::errors::Result;
use crate::models::{Upload, Usage, User};

/// Fixed snapshot held in memory, for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot {
    pub users: Vec<User>,
    pub usages: Vec<Usage>,
    pub uploads: Vec<Upload>,
}

impl MemorySnapshot {
    pub fn new(users: Vec<User>, usages: Vec<Usage>, uploads: Vec<Upload>) -> Self {
        Self {
            users,
            usages,
            uploads,
        }
    }
}

#[async_trait]
impl SnapshotProvider for MemorySnapshot {
    async fn users(&self) -> Result<Vec<User>> {
        Ok(self.users.clone())
    }

    async fn usages(&self) -> Result<Vec<Usage>> {
        Ok(self.usages.clone())
    }

    async fn uploads(&self) -> Result<Vec<Upload>> {
        Ok(self.uploads.clone())
    }
}
