use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{HashMap, HashSet};

use crate::errors::{AppError, Result};
use crate::models::{Upload, UploadMode};
use crate::services::ipfs::ContentSizeLookup;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn count(uploads: &[Upload], mode: UploadMode) -> usize {
    match mode {
        UploadMode::All => uploads.len(),
        UploadMode::Unique => uploads
            .iter()
            .map(|upload| upload.hash.as_str())
            .collect::<HashSet<_>>()
            .len(),
    }
}

/// The records an average is taken over. In unique mode the first record
/// seen for each hash represents it.
pub fn effective_uploads(uploads: &[Upload], mode: UploadMode) -> Vec<&Upload> {
    match mode {
        UploadMode::All => uploads.iter().collect(),
        UploadMode::Unique => {
            let mut seen = HashSet::new();
            uploads
                .iter()
                .filter(|upload| seen.insert(upload.hash.as_str()))
                .collect()
        }
    }
}

/// Distinct hashes in first-seen order, each with the number of effective
/// records it stands for.
fn hash_weights(uploads: &[Upload], mode: UploadMode) -> Vec<(&str, u64)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut weights: Vec<(&str, u64)> = Vec::new();

    for upload in uploads {
        let hash = upload.hash.as_str();
        match positions.get(hash) {
            Some(&index) => {
                if mode == UploadMode::All {
                    weights[index].1 += 1;
                }
            }
            None => {
                positions.insert(hash, weights.len());
                weights.push((hash, 1));
            }
        }
    }

    weights
}

/// Average stored size of the effective upload set, in gigabytes.
///
/// Each distinct hash is looked up once, with at most `concurrency` lookups
/// in flight. The first failed lookup aborts the rest.
pub async fn average_size_gb(
    uploads: &[Upload],
    mode: UploadMode,
    sizes: &dyn ContentSizeLookup,
    concurrency: usize,
) -> Result<f64> {
    let weights = hash_weights(uploads, mode);
    let effective: u64 = weights.iter().map(|(_, weight)| weight).sum();
    if effective == 0 {
        return Err(AppError::EmptySet);
    }

    tracing::debug!(
        distinct = weights.len(),
        effective,
        "looking up upload sizes"
    );

    let total_bytes = stream::iter(weights)
        .map(|(hash, weight)| async move {
            sizes
                .stat(hash)
                .await
                .map(|stat| u128::from(stat.cumulative_size) * u128::from(weight))
                .map_err(|source| AppError::SizeLookup {
                    hash: hash.to_string(),
                    source,
                })
        })
        .buffer_unordered(concurrency.max(1))
        .try_fold(0u128, |total, bytes| async move { Ok(total + bytes) })
        .await?;

    let total_gigabytes = total_bytes as f64 / BYTES_PER_GB;
    Ok(total_gigabytes / effective as f64)
}
