pub mod activity;
pub mod ipfs;
pub mod mail;
pub mod segmenter;
pub mod upload_stats;

pub use activity::{active_since, Timestamped};
pub use ipfs::{ContentSizeLookup, IpfsClient, ObjectStat, StatError};
pub use mail::{MailClient, Recipient, ReportSink};
pub use segmenter::segment_by_tier;
