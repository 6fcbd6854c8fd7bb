use chrono::{DateTime, Duration, Utc};

use crate::models::{Usage, User};

/// Anything carrying a last-modified time.
pub trait Timestamped {
    fn updated_at(&self) -> DateTime<Utc>;
}

impl Timestamped for User {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Timestamped for Usage {
    fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Records updated strictly after `now - window`.
pub fn active_since<T>(records: &[T], now: DateTime<Utc>, window: Duration) -> Vec<T>
where
    T: Timestamped + Clone,
{
    // Cutoff before the representable range: everything is inside the window.
    let Some(cutoff) = now.checked_sub_signed(window) else {
        return records.to_vec();
    };

    records
        .iter()
        .filter(|record| record.updated_at() > cutoff)
        .cloned()
        .collect()
}
