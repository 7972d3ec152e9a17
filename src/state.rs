use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::Config;
use crate::models::delivery::Delivery;
use crate::models::order::Order;
use crate::observability::metrics::Metrics;

pub struct AppState {
    pub config: Config,
    pub orders: DashMap<Uuid, Order>,
    /// Active and archived deliveries, keyed by order id. Entry guards
    /// serialize mutations per order; different orders never contend.
    pub deliveries: DashMap<Uuid, Delivery>,
    /// Arena of advancer task handles, one per in-flight delivery. Tasks
    /// remove their own entry when they stop.
    pub advancers: DashMap<Uuid, JoinHandle<()>>,
    pub delivery_events_tx: broadcast::Sender<Delivery>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let (delivery_events_tx, _unused_rx) = broadcast::channel(config.event_buffer_size);

        Self {
            config,
            orders: DashMap::new(),
            deliveries: DashMap::new(),
            advancers: DashMap::new(),
            delivery_events_tx,
            metrics: Metrics::new(),
        }
    }
}
