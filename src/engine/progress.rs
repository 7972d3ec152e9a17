use chrono::{DateTime, Utc};

use crate::models::delivery::DeliveryStatus;

/// Coarse stage-based progress for the client progress bar. Distance along
/// the route does not feed into this number.
pub fn progress_percent(status: DeliveryStatus) -> f64 {
    ((status.index() + 1) as f64 / DeliveryStatus::COUNT as f64) * 100.0
}

/// Whole minutes until the estimated arrival, floored at zero.
pub fn estimated_minutes_remaining(eta: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (eta - now).num_minutes().max(0)
}
