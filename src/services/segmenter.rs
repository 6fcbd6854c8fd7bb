use std::collections::HashMap;

use crate::errors::{AppError, Result};
use crate::models::{Tier, Usage, User};

/// Users whose usage record is on `tier`, in usage-snapshot order.
///
/// A matching usage row without a user row fails the whole call.
pub fn segment_by_tier(users: &[User], usages: &[Usage], tier: &Tier) -> Result<Vec<User>> {
    let by_username: HashMap<&str, &User> = users
        .iter()
        .map(|user| (user.username.as_str(), user))
        .collect();

    usages
        .iter()
        .filter(|usage| &usage.tier == tier)
        .map(|usage| {
            by_username
                .get(usage.username.as_str())
                .map(|user| (*user).clone())
                .ok_or_else(|| AppError::ReferentialIntegrity {
                    username: usage.username.clone(),
                })
        })
        .collect()
}
