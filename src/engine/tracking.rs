use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::geo::{haversine_km, point_along, smoothstep};
use crate::models::delivery::{Delivery, DeliveryStatus, Driver};
use crate::models::order::OrderStatus;
use crate::state::AppState;

/// Route fraction at which the pipeline hands off from `Enroute` to
/// `Arriving`.
const HANDOFF_FRACTION: f64 = 0.85;

#[derive(Debug, Clone, Copy)]
struct StagePlan {
    /// Ticks the stage lasts before the status advances.
    ticks: u32,
    /// Portion of the restaurant→customer route covered during the stage.
    route_span: (f64, f64),
}

fn stage_plan(status: DeliveryStatus) -> StagePlan {
    match status {
        DeliveryStatus::Searching => StagePlan {
            ticks: 1,
            route_span: (0.0, 0.0),
        },
        DeliveryStatus::Assigned => StagePlan {
            ticks: 1,
            route_span: (0.0, 0.0),
        },
        DeliveryStatus::ArrivingPickup => StagePlan {
            ticks: 2,
            route_span: (0.0, 0.0),
        },
        DeliveryStatus::ReachedPickup => StagePlan {
            ticks: 1,
            route_span: (0.0, 0.0),
        },
        DeliveryStatus::PickedUp => StagePlan {
            ticks: 1,
            route_span: (0.0, 0.0),
        },
        DeliveryStatus::Enroute => StagePlan {
            ticks: 8,
            route_span: (0.0, HANDOFF_FRACTION),
        },
        DeliveryStatus::Arriving => StagePlan {
            ticks: 3,
            route_span: (HANDOFF_FRACTION, 1.0),
        },
        DeliveryStatus::Delivered => StagePlan {
            ticks: 0,
            route_span: (1.0, 1.0),
        },
    }
}

/// Fraction of the restaurant→customer route covered so far. Eased within
/// the stage, but monotonic across any tick sequence: stage spans are
/// contiguous and smoothstep never decreases.
fn route_fraction(status: DeliveryStatus, stage_ticks: u32) -> f64 {
    let plan = stage_plan(status);
    let within = if plan.ticks == 0 {
        1.0
    } else {
        f64::from(stage_ticks) / f64::from(plan.ticks)
    };
    let (start, end) = plan.route_span;
    start + smoothstep(within) * (end - start)
}

fn remaining_prep_ticks(status: DeliveryStatus, stage_ticks: u32) -> u32 {
    if status.index() >= DeliveryStatus::Enroute.index() {
        return 0;
    }
    let mut remaining = stage_plan(status).ticks.saturating_sub(stage_ticks);
    let mut cursor = status.next();
    while cursor.index() < DeliveryStatus::Enroute.index() {
        remaining += stage_plan(cursor).ticks;
        cursor = cursor.next();
    }
    remaining
}

fn estimate_arrival(delivery: &Delivery, now: DateTime<Utc>, config: &Config) -> DateTime<Utc> {
    let total_km = haversine_km(&delivery.restaurant, &delivery.customer);
    let remaining_km = total_km * (1.0 - route_fraction(delivery.status, delivery.stage_ticks));
    let travel_minutes = if config.driver_speed_kmh > 0.0 {
        remaining_km / config.driver_speed_kmh * 60.0
    } else {
        0.0
    };

    let prep_total = remaining_prep_ticks(DeliveryStatus::Assigned, 0);
    let prep_minutes = if prep_total > 0 {
        config.pickup_prep_minutes as f64
            * f64::from(remaining_prep_ticks(delivery.status, delivery.stage_ticks))
            / f64::from(prep_total)
    } else {
        0.0
    };

    now + Duration::milliseconds(((travel_minutes + prep_minutes) * 60_000.0).round() as i64)
}

const DRIVER_ROSTER: &[(&str, &str)] = &[
    ("Ravi Kumar", "Bike"),
    ("Amit Sharma", "Scooter"),
    ("Sara Khan", "Bike"),
    ("Diego Morales", "Scooter"),
    ("Lena Fischer", "Bicycle"),
    ("Tunde Adeyemi", "Bike"),
];

fn synthesize_driver() -> Driver {
    let mut rng = rand::thread_rng();
    let (name, vehicle_type) = DRIVER_ROSTER[rng.gen_range(0..DRIVER_ROSTER.len())];

    Driver {
        name: name.to_string(),
        vehicle_type: vehicle_type.to_string(),
        vehicle_number: format!(
            "KA-{:02}-{:04}",
            rng.gen_range(1..=99),
            rng.gen_range(1000..=9999)
        ),
        phone: format!("+91-9{:09}", rng.gen_range(0..1_000_000_000u32)),
    }
}

/// Assign a driver to an order. Idempotent: an order that already has a
/// delivery gets the existing one back unchanged.
pub fn assign(state: &AppState, order_id: Uuid) -> Result<Delivery, AppError> {
    let order = state
        .orders
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("order {order_id} not found")))?;

    let Some(dropoff) = order.dropoff else {
        state
            .metrics
            .assignments_total
            .with_label_values(&["not_deliverable"])
            .inc();
        return Err(AppError::NotDeliverable(order_id));
    };

    match state.deliveries.entry(order_id) {
        Entry::Occupied(existing) => Ok(existing.get().clone()),
        Entry::Vacant(slot) => {
            let now = Utc::now();
            // A roster driver is always on hand, so the pipeline starts at
            // Assigned. Searching stays valid for ticking; the default path
            // just never dwells there.
            let mut delivery = Delivery {
                order_id,
                status: DeliveryStatus::Assigned,
                driver: synthesize_driver(),
                restaurant: order.restaurant,
                customer: dropoff,
                current_location: order.restaurant,
                stage_ticks: 0,
                estimated_arrival: now,
                assigned_at: now,
            };
            delivery.estimated_arrival = estimate_arrival(&delivery, now, &state.config);

            slot.insert(delivery.clone());
            state
                .metrics
                .assignments_total
                .with_label_values(&["assigned"])
                .inc();
            state.metrics.active_deliveries.inc();

            info!(
                order_id = %order_id,
                driver = %delivery.driver.name,
                vehicle = %delivery.driver.vehicle_number,
                "driver assigned"
            );

            Ok(delivery)
        }
    }
}

/// Advance a delivery one simulation step. Terminal deliveries and
/// deliveries whose order was cancelled come back unchanged; a missing
/// delivery is `NotFound`.
pub fn tick(state: &AppState, order_id: Uuid) -> Result<Delivery, AppError> {
    let snapshot = {
        let mut entry = state
            .deliveries
            .get_mut(&order_id)
            .ok_or_else(|| AppError::NotFound(format!("no delivery for order {order_id}")))?;
        let delivery = entry.value_mut();

        if delivery.status.is_terminal() {
            return Ok(delivery.clone());
        }

        let order_cancelled = state
            .orders
            .get(&order_id)
            .map(|order| order.status == OrderStatus::Cancelled)
            .unwrap_or(false);
        if order_cancelled {
            return Ok(delivery.clone());
        }

        advance_one_step(delivery, &state.config);
        delivery.clone()
    };

    state
        .metrics
        .delivery_ticks_total
        .with_label_values(&[stage_label(snapshot.status)])
        .inc();

    if snapshot.status.is_terminal() {
        state.metrics.active_deliveries.dec();
        let elapsed = (Utc::now() - snapshot.assigned_at).num_milliseconds() as f64 / 1_000.0;
        state.metrics.delivery_duration_seconds.observe(elapsed);
        info!(order_id = %order_id, "delivery completed");
    }

    let _ = state.delivery_events_tx.send(snapshot.clone());

    Ok(snapshot)
}

fn advance_one_step(delivery: &mut Delivery, config: &Config) {
    delivery.stage_ticks += 1;

    if delivery.stage_ticks >= stage_plan(delivery.status).ticks {
        delivery.status = delivery.status.next();
        delivery.stage_ticks = 0;
    }

    delivery.current_location = if delivery.status.is_terminal() {
        delivery.customer
    } else {
        let fraction = route_fraction(delivery.status, delivery.stage_ticks);
        point_along(&delivery.restaurant, &delivery.customer, fraction)
    };

    delivery.estimated_arrival = estimate_arrival(delivery, Utc::now(), config);
}

fn stage_label(status: DeliveryStatus) -> &'static str {
    match status {
        DeliveryStatus::Searching => "searching",
        DeliveryStatus::Assigned => "assigned",
        DeliveryStatus::ArrivingPickup => "arriving_pickup",
        DeliveryStatus::ReachedPickup => "reached_pickup",
        DeliveryStatus::PickedUp => "picked_up",
        DeliveryStatus::Enroute => "enroute",
        DeliveryStatus::Arriving => "arriving",
        DeliveryStatus::Delivered => "delivered",
    }
}

/// Fraction of the route covered by a snapshot, for callers that need a
/// distance-based reading alongside the stage-based percentage.
pub fn route_fraction_of(delivery: &Delivery) -> f64 {
    route_fraction(delivery.status, delivery.stage_ticks)
}
