use crate::{config::Config, database::SnapshotProvider, services::ipfs::ContentSizeLookup};
use std::sync::Arc;

pub mod upload;
pub mod user;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: Arc<dyn SnapshotProvider>,
    pub sizes: Arc<dyn ContentSizeLookup>,
    pub config: Config,
}

impl AppState {
    pub fn new(
        snapshots: Arc<dyn SnapshotProvider>,
        sizes: Arc<dyn ContentSizeLookup>,
        config: Config,
    ) -> Self {
        Self {
            snapshots,
            sizes,
            config,
        }
    }
}
