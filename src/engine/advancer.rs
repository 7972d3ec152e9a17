use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use tokio::time::{interval_at, Duration, Instant};
use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::tracking;
use crate::models::order::OrderStatus;
use crate::state::AppState;

/// Start the timer task for a delivery unless one is already running.
/// Called after assignment; safe to call again on repeated assigns.
///
/// Orders that are already cancelled, and deliveries that already reached
/// the terminal stage, get no timer: their gauge accounting has already
/// happened, and a fresh task would repeat the cancel-branch decrement.
pub fn ensure_running(state: &Arc<AppState>, order_id: Uuid) {
    let advanceable = state
        .orders
        .get(&order_id)
        .map(|order| order.status != OrderStatus::Cancelled)
        .unwrap_or(false);
    if !advanceable {
        return;
    }

    let terminal = state
        .deliveries
        .get(&order_id)
        .map(|delivery| delivery.status.is_terminal())
        .unwrap_or(true);
    if terminal {
        return;
    }

    match state.advancers.entry(order_id) {
        Entry::Occupied(_) => {}
        Entry::Vacant(slot) => {
            let handle = tokio::spawn(run_advancer(state.clone(), order_id));
            slot.insert(handle);
        }
    }
}

/// One task per active delivery. Ticks on a fixed interval and exits when
/// the delivery turns terminal, the order is cancelled, or the delivery
/// disappears. The task removes its own arena entry on the way out, so
/// finished deliveries hold no timer.
async fn run_advancer(state: Arc<AppState>, order_id: Uuid) {
    // First tick lands one full interval after assignment.
    let period = Duration::from_millis(state.config.tick_interval_ms);
    let mut ticker = interval_at(Instant::now() + period, period);
    debug!(order_id = %order_id, "advancer started");

    loop {
        ticker.tick().await;

        match tracking::tick(&state, order_id) {
            Ok(snapshot) if snapshot.status.is_terminal() => break,
            Ok(_) => {}
            Err(_) => break,
        }

        let cancelled = state
            .orders
            .get(&order_id)
            .map(|order| order.status == OrderStatus::Cancelled)
            .unwrap_or(true);
        if cancelled {
            info!(order_id = %order_id, "order cancelled; stopping advancement");
            state.metrics.active_deliveries.dec();
            break;
        }
    }

    state.advancers.remove(&order_id);
    debug!(order_id = %order_id, "advancer stopped");
}

/// Abort every live advancer task. Used on shutdown so no timers outlive
/// the server.
pub fn abort_all(state: &AppState) {
    for entry in state.advancers.iter() {
        entry.value().abort();
    }
    state.advancers.clear();
}
