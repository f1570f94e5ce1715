//! Prometheus metrics for the deployer.
//!
//! All metrics follow the naming convention: `cs_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DEPLOYMENT METRICS (Subsystems 2, 3)
    // =========================================================================

    /// Plan steps processed
    pub static ref DEPLOYMENT_STEPS: CounterVec = CounterVec::new(
        Opts::new("cs_deploy_steps_total", "Deployment plan steps processed"),
        &["network", "action"]  // action: created/reused
    ).expect("metric creation failed");

    /// Deployment runs that returned an error
    pub static ref DEPLOYMENT_FAILURES: CounterVec = CounterVec::new(
        Opts::new("cs_deploy_failures_total", "Deployment runs that failed"),
        &["network", "kind"]
    ).expect("metric creation failed");

    /// Wall time of one deployment run
    pub static ref DEPLOYMENT_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cs_deploy_duration_seconds",
            "Time spent executing a deployment plan"
        ).buckets(exponential_buckets(0.01, 2.0, 16).expect("valid buckets")),
        &["network"]
    ).expect("metric creation failed");

    /// Artifacts recorded per network after the last run
    pub static ref ARTIFACTS_TRACKED: IntGaugeVec = IntGaugeVec::new(
        Opts::new("cs_store_artifacts", "Artifacts recorded in the store"),
        &["network"]
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY METRICS (Subsystem 4)
    // =========================================================================

    /// Relay attempts by outcome
    pub static ref RELAY_ATTEMPTS: CounterVec = CounterVec::new(
        Opts::new("cs_relay_attempts_total", "Governance message relay attempts"),
        &["satellite", "outcome"]  // outcome: confirmed/failed
    ).expect("metric creation failed");

    /// Time spent relaying, confirmation waits included
    pub static ref RELAY_CONFIRMATION_WAIT: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cs_relay_confirmation_wait_seconds",
            "Time spent submitting and confirming relayed messages"
        ).buckets(exponential_buckets(0.01, 2.0, 20).expect("valid buckets")),
        &["satellite"]
    ).expect("metric creation failed");
}

/// Register every metric with [`REGISTRY`]. Safe to call more than once.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(DEPLOYMENT_STEPS.clone()),
        Box::new(DEPLOYMENT_FAILURES.clone()),
        Box::new(DEPLOYMENT_DURATION.clone()),
        Box::new(ARTIFACTS_TRACKED.clone()),
        Box::new(RELAY_ATTEMPTS.clone()),
        Box::new(RELAY_CONFIRMATION_WAIT.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }
    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }

    /// Start a timer for one label set of `histogram`.
    pub fn labelled(histogram: &HistogramVec, labels: &[&str]) -> Self {
        Self::new(&histogram.with_label_values(labels))
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
