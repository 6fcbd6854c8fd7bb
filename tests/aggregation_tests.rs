use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tfarmer::{
    config::Config,
    database::memory::MemorySnapshot,
    errors::AppError,
    handlers::{upload, user, AppState},
    models::{ReportValue, Tier, Upload, UploadMode, Usage, User},
    services::{segment_by_tier, upload_stats, ContentSizeLookup, ObjectStat, StatError},
};

const GB: u64 = 1024 * 1024 * 1024;

#[derive(Default)]
struct FixedSizes {
    sizes: HashMap<String, u64>,
    calls: AtomicUsize,
}

impl FixedSizes {
    fn with(entries: &[(&str, u64)]) -> Self {
        Self {
            sizes: entries.iter().map(|(h, s)| (h.to_string(), *s)).collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ContentSizeLookup for FixedSizes {
    async fn stat(&self, hash: &str) -> Result<ObjectStat, StatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sizes
            .get(hash)
            .map(|size| ObjectStat {
                hash: hash.to_string(),
                cumulative_size: *size,
            })
            .ok_or_else(|| StatError::NotFound(hash.to_string()))
    }
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap()
}

fn user(name: &str, updated_at: DateTime<Utc>) -> User {
    User {
        username: name.to_string(),
        email: format!("{}@example.org", name),
        created_at: base_time() - Duration::days(30),
        updated_at,
    }
}

fn usage(name: &str, tier: Tier, updated_at: DateTime<Utc>) -> Usage {
    Usage {
        username: name.to_string(),
        tier,
        updated_at,
    }
}

fn upload(hash: &str, owner: &str) -> Upload {
    Upload {
        hash: hash.to_string(),
        username: owner.to_string(),
        created_at: base_time(),
    }
}

fn state(snapshot: MemorySnapshot, sizes: FixedSizes) -> (AppState, Arc<FixedSizes>) {
    let sizes = Arc::new(sizes);
    let state = AppState::new(Arc::new(snapshot), sizes.clone(), Config::default());
    (state, sizes)
}

#[tokio::test]
async fn test_shared_hash_counts_and_averages() {
    let snapshot = MemorySnapshot::new(vec![], vec![], vec![upload("A", "u1"), upload("A", "u2")]);
    let (state, sizes) = state(snapshot, FixedSizes::with(&[("A", 2 * GB)]));

    let all = upload::upload_count(&state, UploadMode::All).await.unwrap();
    let unique = upload::upload_count(&state, UploadMode::Unique).await.unwrap();
    assert_eq!(all.value, ReportValue::Count(2));
    assert_eq!(unique.value, ReportValue::Count(1));

    let all = upload::average_upload_size(&state, UploadMode::All).await.unwrap();
    let unique = upload::average_upload_size(&state, UploadMode::Unique)
        .await
        .unwrap();
    assert_eq!(all.value, ReportValue::AverageGb(2.0));
    assert_eq!(unique.value, ReportValue::AverageGb(2.0));
    assert_eq!(
        unique.message,
        "the unique average size of uploads is 2 gigabytes"
    );

    // One lookup per distinct hash per average.
    assert_eq!(sizes.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_empty_uploads() {
    let (state, sizes) = state(MemorySnapshot::default(), FixedSizes::default());

    for mode in [UploadMode::All, UploadMode::Unique] {
        let report = upload::upload_count(&state, mode).await.unwrap();
        assert_eq!(report.value, ReportValue::Count(0));

        let result = upload::average_upload_size(&state, mode).await;
        assert!(matches!(result, Err(AppError::EmptySet)));
    }
    assert_eq!(sizes.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_usage_activity_window() {
    let t = base_time();
    let snapshot = MemorySnapshot::new(
        vec![user("u1", t)],
        vec![usage("u1", Tier::Free, t)],
        vec![],
    );
    let (state, _) = state(snapshot, FixedSizes::default());
    let now = t + Duration::hours(23);

    let day = user::active_usage(&state, now, 24).await.unwrap();
    let shorter = user::active_usage(&state, now, 22).await.unwrap();
    assert_eq!(day.value, ReportValue::Count(1));
    assert_eq!(shorter.value, ReportValue::Count(0));
    assert_eq!(
        day.message,
        "there are 1 usage records active in the last 24 hours"
    );
}

#[tokio::test]
async fn test_login_activity_uses_user_table() {
    let t = base_time();
    let snapshot = MemorySnapshot::new(
        vec![user("recent", t - Duration::hours(2)), user("stale", t - Duration::days(3))],
        vec![usage("stale", Tier::Free, t - Duration::hours(1))],
        vec![],
    );
    let (state, _) = state(snapshot, FixedSizes::default());

    let report = user::active_users(&state, t, 24).await.unwrap();
    assert_eq!(report.value, ReportValue::Count(1));
}

#[tokio::test]
async fn test_ghost_usage_fails_segment() {
    let t = base_time();
    let snapshot = MemorySnapshot::new(
        vec![user("u1", t)],
        vec![usage("u1", Tier::Free, t), usage("ghost", Tier::Free, t)],
        vec![],
    );
    let (state, _) = state(snapshot, FixedSizes::default());

    match user::users_by_tier(&state, &Tier::Free).await {
        Err(AppError::ReferentialIntegrity { username }) => assert_eq!(username, "ghost"),
        other => panic!("expected referential integrity error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_tier_reports_count_their_own_tier() {
    let t = base_time();
    let snapshot = MemorySnapshot::new(
        vec![user("testuser1", t), user("testuser2", t), user("testuser3", t)],
        vec![
            usage("testuser1", Tier::Free, t),
            usage("testuser2", Tier::Paid, t),
            usage("testuser3", Tier::Plus, t),
        ],
        vec![],
    );
    let (state, _) = state(snapshot, FixedSizes::default());

    let registered = user::registered_users(&state).await.unwrap();
    assert_eq!(registered.message, "there are 3 total registered users");

    for (tier, expected) in [
        (Tier::Free, 1),
        (Tier::Light, 0),
        (Tier::Plus, 1),
        (Tier::Paid, 1),
        (Tier::from("partner"), 0),
    ] {
        let report = user::users_by_tier(&state, &tier).await.unwrap();
        assert_eq!(report.value, ReportValue::Count(expected), "tier {}", tier);
        assert_eq!(report.title, format!("{} users report", tier));
    }
}

#[tokio::test]
async fn test_tier_list_carries_segment_in_usage_order() {
    let t = base_time();
    let snapshot = MemorySnapshot::new(
        vec![user("alpha", t), user("bravo", t), user("charlie", t)],
        vec![
            usage("charlie", Tier::Paid, t),
            usage("bravo", Tier::Free, t),
            usage("alpha", Tier::Paid, t),
        ],
        vec![],
    );
    let (state, _) = state(snapshot, FixedSizes::default());

    let report = user::list_users_by_tier(&state, &Tier::Paid).await.unwrap();
    assert_eq!(report.message, "there are 2 total paid users");
    match report.value {
        ReportValue::Users(users) => {
            let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
            assert_eq!(names, ["charlie", "alpha"]);
            assert_eq!(users[0], user("charlie", t));
        }
        other => panic!("expected a user list, got {:?}", other),
    }

    let empty = user::list_users_by_tier(&state, &Tier::Light).await.unwrap();
    assert_eq!(empty.value, ReportValue::Users(vec![]));
}

#[tokio::test]
async fn test_missing_size_fails_average() {
    let snapshot = MemorySnapshot::new(vec![], vec![], vec![upload("A", "u1"), upload("B", "u1")]);
    let (state, _) = state(snapshot, FixedSizes::with(&[("A", GB)]));

    match upload::average_upload_size(&state, UploadMode::Unique).await {
        Err(AppError::SizeLookup { hash, .. }) => assert_eq!(hash, "B"),
        other => panic!("expected size lookup error, got {:?}", other),
    }
}

fn mixed_uploads() -> Vec<Upload> {
    ["A", "B", "A", "C", "B", "A", "D"]
        .iter()
        .enumerate()
        .map(|(i, hash)| upload(hash, &format!("u{}", i)))
        .collect()
}

#[test]
fn test_unique_count_never_exceeds_total() {
    let cases = vec![
        vec![],
        vec![upload("A", "u1")],
        vec![upload("A", "u1"), upload("B", "u2"), upload("C", "u3")],
        mixed_uploads(),
    ];

    for uploads in cases {
        let unique = upload_stats::count(&uploads, UploadMode::Unique);
        let all = upload_stats::count(&uploads, UploadMode::All);
        assert!(unique <= all);

        let distinct = uploads
            .iter()
            .map(|u| u.hash.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        assert_eq!(unique == all, distinct == uploads.len());
    }
}

#[tokio::test]
async fn test_aggregators_are_idempotent() {
    let uploads = mixed_uploads();
    let sizes = FixedSizes::with(&[("A", GB), ("B", 3 * GB), ("C", 0), ("D", GB / 2)]);

    for mode in [UploadMode::All, UploadMode::Unique] {
        let first = upload_stats::average_size_gb(&uploads, mode, &sizes, 3)
            .await
            .unwrap();
        let second = upload_stats::average_size_gb(&uploads, mode, &sizes, 3)
            .await
            .unwrap();
        assert_eq!(first, second);
        assert!(first >= 0.0);
        assert_eq!(
            upload_stats::count(&uploads, mode),
            upload_stats::count(&uploads, mode)
        );
    }
}

#[test]
fn test_tier_segments_are_disjoint() {
    let t = base_time();
    let users: Vec<_> = (0..8).map(|i| user(&format!("u{}", i), t)).collect();
    let tiers = [Tier::Free, Tier::Light, Tier::Plus, Tier::Paid];
    let usages: Vec<_> = users
        .iter()
        .enumerate()
        .map(|(i, u)| usage(&u.username, tiers[i % tiers.len()].clone(), t))
        .collect();

    for (i, a) in tiers.iter().enumerate() {
        for b in tiers.iter().skip(i + 1) {
            let left = segment_by_tier(&users, &usages, a).unwrap();
            let right = segment_by_tier(&users, &usages, b).unwrap();
            assert!(left.iter().all(|u| !right.contains(u)), "{} and {} overlap", a, b);
        }
    }
}
