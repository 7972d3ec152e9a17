use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Fixed delivery pipeline; variants are ordered and only ever advance
/// left to right. `Delivered` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    Searching,
    Assigned,
    ArrivingPickup,
    ReachedPickup,
    PickedUp,
    Enroute,
    Arriving,
    Delivered,
}

impl DeliveryStatus {
    pub const COUNT: usize = 8;

    pub fn index(self) -> usize {
        match self {
            DeliveryStatus::Searching => 0,
            DeliveryStatus::Assigned => 1,
            DeliveryStatus::ArrivingPickup => 2,
            DeliveryStatus::ReachedPickup => 3,
            DeliveryStatus::PickedUp => 4,
            DeliveryStatus::Enroute => 5,
            DeliveryStatus::Arriving => 6,
            DeliveryStatus::Delivered => 7,
        }
    }

    pub fn next(self) -> DeliveryStatus {
        match self {
            DeliveryStatus::Searching => DeliveryStatus::Assigned,
            DeliveryStatus::Assigned => DeliveryStatus::ArrivingPickup,
            DeliveryStatus::ArrivingPickup => DeliveryStatus::ReachedPickup,
            DeliveryStatus::ReachedPickup => DeliveryStatus::PickedUp,
            DeliveryStatus::PickedUp => DeliveryStatus::Enroute,
            DeliveryStatus::Enroute => DeliveryStatus::Arriving,
            DeliveryStatus::Arriving => DeliveryStatus::Delivered,
            DeliveryStatus::Delivered => DeliveryStatus::Delivered,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == DeliveryStatus::Delivered
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub name: String,
    pub vehicle_type: String,
    pub vehicle_number: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    pub order_id: Uuid,
    pub status: DeliveryStatus,
    pub driver: Driver,
    pub restaurant: GeoPoint,
    pub customer: GeoPoint,
    pub current_location: GeoPoint,
    /// Ticks completed within the current stage; resets on every stage change.
    pub stage_ticks: u32,
    pub estimated_arrival: DateTime<Utc>,
    pub assigned_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::DeliveryStatus;

    #[test]
    fn next_moves_forward_through_every_stage() {
        let mut status = DeliveryStatus::Searching;
        let mut seen = 1;
        while !status.is_terminal() {
            let following = status.next();
            assert_eq!(following.index(), status.index() + 1);
            status = following;
            seen += 1;
        }
        assert_eq!(seen, DeliveryStatus::COUNT);
    }

    #[test]
    fn delivered_is_a_fixed_point() {
        assert_eq!(DeliveryStatus::Delivered.next(), DeliveryStatus::Delivered);
        assert!(DeliveryStatus::Delivered.is_terminal());
    }
}
