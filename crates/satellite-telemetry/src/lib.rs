//! # Satellite Telemetry
//!
//! Logging and metrics for the deployer.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with an `EnvFilter` and a pretty or JSON
//!   `fmt` layer.
//! - **Metrics**: Prometheus counters and histograms in a global registry,
//!   exposed as text through [`encode_metrics`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use satellite_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `comet-satellite` | Service name in log records |
//! | `CS_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `CS_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `CS_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

#![warn(missing_docs)]

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, HistogramTimer, ARTIFACTS_TRACKED, DEPLOYMENT_DURATION,
    DEPLOYMENT_FAILURES, DEPLOYMENT_STEPS, RELAY_ATTEMPTS, RELAY_CONFIRMATION_WAIT,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The subscriber could not be installed.
    #[error("Failed to initialize tracing: {0}")]
    TracingInit(String),

    /// A metric could not be registered or encoded.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install logging and register metrics.
///
/// Returns a guard to hold for the lifetime of the process.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    register_metrics()?;
    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Record a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_service_name() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "comet-satellite");
    }

    #[test]
    fn test_metric_inc_macro() {
        metric_inc!(DEPLOYMENT_STEPS, &["macro-test", "created"]);
        assert!(
            DEPLOYMENT_STEPS
                .with_label_values(&["macro-test", "created"])
                .get()
                >= 1.0
        );
    }
}
