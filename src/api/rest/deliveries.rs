use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::{advancer, progress, tracking};
use crate::error::AppError;
use crate::models::delivery::Delivery;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/orders/:id/delivery",
            post(assign_delivery).get(get_delivery),
        )
        .route("/orders/:id/delivery/advance", post(advance_delivery))
}

/// Wire shape for every delivery read: the record plus the derivations,
/// recomputed against `now` on each response.
#[derive(Serialize)]
pub struct DeliverySnapshot {
    #[serde(flatten)]
    pub delivery: Delivery,
    pub progress_percent: f64,
    pub estimated_minutes_remaining: i64,
}

impl From<Delivery> for DeliverySnapshot {
    fn from(delivery: Delivery) -> Self {
        let now = Utc::now();
        Self {
            progress_percent: progress::progress_percent(delivery.status),
            estimated_minutes_remaining: progress::estimated_minutes_remaining(
                delivery.estimated_arrival,
                now,
            ),
            delivery,
        }
    }
}

async fn assign_delivery(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<DeliverySnapshot>, AppError> {
    let delivery = tracking::assign(&state, order_id)?;
    advancer::ensure_running(&state, order_id);
    Ok(Json(delivery.into()))
}

async fn get_delivery(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<DeliverySnapshot>, AppError> {
    let delivery = state
        .deliveries
        .get(&order_id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("no delivery for order {order_id}")))?;

    Ok(Json(delivery.into()))
}

/// Manual tick for clients that poll instead of relying on the server
/// timer. Ticking a terminal delivery returns the snapshot unchanged.
async fn advance_delivery(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<DeliverySnapshot>, AppError> {
    let delivery = tracking::tick(&state, order_id)?;
    Ok(Json(delivery.into()))
}
