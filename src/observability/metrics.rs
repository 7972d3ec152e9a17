use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub assignments_total: IntCounterVec,
    pub active_deliveries: IntGauge,
    pub delivery_ticks_total: IntCounterVec,
    pub delivery_duration_seconds: Histogram,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Driver assignments by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let active_deliveries =
            IntGauge::new("active_deliveries", "Deliveries currently in flight")
                .expect("valid active_deliveries metric");

        let delivery_ticks_total = IntCounterVec::new(
            Opts::new("delivery_ticks_total", "Simulation ticks by resulting stage"),
            &["stage"],
        )
        .expect("valid delivery_ticks_total metric");

        let delivery_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "delivery_duration_seconds",
            "Wall time from assignment to delivered",
        ))
        .expect("valid delivery_duration_seconds metric");

        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(active_deliveries.clone()))
            .expect("register active_deliveries");
        registry
            .register(Box::new(delivery_ticks_total.clone()))
            .expect("register delivery_ticks_total");
        registry
            .register(Box::new(delivery_duration_seconds.clone()))
            .expect("register delivery_duration_seconds");

        Self {
            registry,
            assignments_total,
            active_deliveries,
            delivery_ticks_total,
            delivery_duration_seconds,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
