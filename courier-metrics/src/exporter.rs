//! OTLP/HTTP push exporter

use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};

use crate::{MetricsConfig, MetricsError};

/// Build a meter provider that pushes to the configured collector on a fixed interval.
///
/// # Errors
///
/// Returns an error if the OTLP exporter cannot be built for the endpoint.
pub fn init_otlp_exporter(config: &MetricsConfig) -> Result<SdkMeterProvider, MetricsError> {
    let exporter = opentelemetry_otlp::MetricExporter::builder()
        .with_http()
        .with_endpoint(config.endpoint.as_str())
        .build()
        .map_err(|e| MetricsError::Exporter {
            endpoint: config.endpoint.clone(),
            reason: e.to_string(),
        })?;

    let reader = PeriodicReader::builder(exporter)
        .with_interval(config.export_interval())
        .build();

    Ok(SdkMeterProvider::builder().with_reader(reader).build())
}
