use chrono::{DateTime, Duration, Utc};

use crate::{
    errors::Result,
    handlers::AppState,
    models::{MetricsReport, Tier, User},
    services::{activity::active_since, segmenter::segment_by_tier},
};

pub async fn registered_users(state: &AppState) -> Result<MetricsReport> {
    let users = state.snapshots.users().await?;
    tracing::info!("Counted {} registered users", users.len());

    Ok(MetricsReport::user_count("registered", users.len()))
}

async fn tier_segment(state: &AppState, tier: &Tier) -> Result<Vec<User>> {
    let users = state.snapshots.users().await?;
    let usages = state.snapshots.usages().await?;

    let segment = segment_by_tier(&users, &usages, tier)?;
    tracing::info!("Counted {} {} users", segment.len(), tier);

    Ok(segment)
}

pub async fn users_by_tier(state: &AppState, tier: &Tier) -> Result<MetricsReport> {
    let segment = tier_segment(state, tier).await?;
    Ok(MetricsReport::user_count(tier.as_str(), segment.len()))
}

/// Like [`users_by_tier`], but the report carries the segment itself.
pub async fn list_users_by_tier(state: &AppState, tier: &Tier) -> Result<MetricsReport> {
    let segment = tier_segment(state, tier).await?;
    Ok(MetricsReport::user_list(tier.as_str(), segment))
}

/// Users whose account was touched (logged in) inside the window.
pub async fn active_users(
    state: &AppState,
    now: DateTime<Utc>,
    window_hours: u32,
) -> Result<MetricsReport> {
    let users = state.snapshots.users().await?;
    let active = active_since(&users, now, Duration::hours(i64::from(window_hours)));
    tracing::info!(
        "{} of {} users active in the last {} hours",
        active.len(),
        users.len(),
        window_hours
    );

    Ok(MetricsReport::active_count("users", active.len(), window_hours))
}

/// Usage rows updated inside the window, i.e. users that used a metered feature.
pub async fn active_usage(
    state: &AppState,
    now: DateTime<Utc>,
    window_hours: u32,
) -> Result<MetricsReport> {
    let usages = state.snapshots.usages().await?;
    let active = active_since(&usages, now, Duration::hours(i64::from(window_hours)));
    tracing::info!(
        "{} of {} usage records updated in the last {} hours",
        active.len(),
        usages.len(),
        window_hours
    );

    Ok(MetricsReport::active_count("usage records", active.len(), window_hours))
}
