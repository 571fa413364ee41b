//! OpenTelemetry metrics for the courier dispatch engine
//!
//! Metrics are pushed over OTLP/HTTP to an OpenTelemetry Collector. Collection
//! is opt-in: until [`init_metrics`] succeeds, [`try_metrics`] returns `None`
//! and the dispatch engine records nothing.
//!
//! # Usage
//!
//! ```rust,no_run
//! use courier_metrics::{init_metrics, MetricsConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MetricsConfig {
//!     enabled: true,
//!     endpoint: "http://localhost:4318/v1/metrics".to_string(),
//!     export_interval_secs: 10,
//! };
//!
//! init_metrics(&config)?;
//! # Ok(())
//! # }
//! ```

mod config;
mod dispatch;
mod error;
mod exporter;

pub use config::MetricsConfig;
pub use dispatch::DispatchMetrics;
pub use error::MetricsError;
use once_cell::sync::OnceCell;

static METRICS: OnceCell<Metrics> = OnceCell::new();

/// Dispatch instruments registered against the global meter provider
#[derive(Debug)]
pub struct Metrics {
    pub dispatch: DispatchMetrics,
}

/// Install the OTLP meter provider and register the dispatch instruments.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns [`MetricsError::AlreadyInitialized`] on a second enabled call, or
/// [`MetricsError::Exporter`] if the collector endpoint is unusable.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if !config.enabled {
        tracing::debug!("Dispatch metrics disabled");
        return Ok(());
    }

    if is_enabled() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let provider = exporter::init_otlp_exporter(config)?;
    opentelemetry::global::set_meter_provider(provider);

    METRICS
        .set(Metrics {
            dispatch: DispatchMetrics::new(),
        })
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    tracing::info!(
        endpoint = %config.endpoint,
        interval_secs = config.export_interval_secs,
        "Exporting dispatch metrics over OTLP"
    );

    Ok(())
}

/// The registered instruments, or `None` while metrics are disabled
#[must_use]
pub fn try_metrics() -> Option<&'static Metrics> {
    METRICS.get()
}

#[must_use]
pub fn is_enabled() -> bool {
    METRICS.get().is_some()
}
