use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::delivery::GeoPoint;
use crate::models::order::{Order, OrderStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/cancel", post(cancel_order))
}

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub restaurant: GeoPoint,
    /// Absent when the customer's address could not be geocoded.
    #[serde(default)]
    pub dropoff: Option<GeoPoint>,
}

async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Order>, AppError> {
    if !coordinate_in_range(&payload.restaurant) {
        return Err(AppError::BadRequest(
            "restaurant coordinate out of range".to_string(),
        ));
    }
    if let Some(dropoff) = &payload.dropoff {
        if !coordinate_in_range(dropoff) {
            return Err(AppError::BadRequest(
                "dropoff coordinate out of range".to_string(),
            ));
        }
    }

    let order = Order {
        id: Uuid::new_v4(),
        restaurant: payload.restaurant,
        dropoff: payload.dropoff,
        status: OrderStatus::Placed,
        created_at: Utc::now(),
    };

    state.orders.insert(order.id, order.clone());
    Ok(Json(order))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .orders
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order.value().clone()))
}

/// External cancellation signal. The delivery's advancer notices the flip
/// on its next tick and stops.
async fn cancel_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, AppError> {
    let mut order = state
        .orders
        .get_mut(&id)
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    if order.status == OrderStatus::Placed {
        order.status = OrderStatus::Cancelled;
    }

    Ok(Json(order.clone()))
}

fn coordinate_in_range(point: &GeoPoint) -> bool {
    (-90.0..=90.0).contains(&point.lat) && (-180.0..=180.0).contains(&point.lng)
}
