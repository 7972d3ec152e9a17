use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::delivery::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Placed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub restaurant: GeoPoint,
    /// Customer destination; `None` when the delivery address could not be
    /// resolved to a coordinate.
    pub dropoff: Option<GeoPoint>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}
