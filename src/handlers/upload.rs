use crate::{
    errors::Result,
    handlers::AppState,
    models::{MetricsReport, UploadMode},
    services::upload_stats,
};

pub async fn upload_count(state: &AppState, mode: UploadMode) -> Result<MetricsReport> {
    let uploads = state.snapshots.uploads().await?;
    let count = upload_stats::count(&uploads, mode);
    tracing::info!("Counted {} {} uploads", count, mode);

    Ok(MetricsReport::upload_count(count, mode))
}

pub async fn average_upload_size(state: &AppState, mode: UploadMode) -> Result<MetricsReport> {
    let uploads = state.snapshots.uploads().await?;
    let average = upload_stats::average_size_gb(
        &uploads,
        mode,
        state.sizes.as_ref(),
        state.config.ipfs.concurrency,
    )
    .await?;
    tracing::info!("The {} average upload size is {} GB", mode, average);

    Ok(MetricsReport::average_upload_size(average, mode))
}
