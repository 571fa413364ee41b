use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    /// [`init_metrics`](crate::init_metrics) already ran with metrics enabled
    #[error("Metrics already initialized")]
    AlreadyInitialized,

    #[error("Failed to build OTLP exporter for {endpoint}: {reason}")]
    Exporter { endpoint: String, reason: String },
}
