use std::time::Duration;

use serde::Deserialize;

/// Where and how often dispatch metrics are pushed
///
/// Collection is off unless `enabled` is set; the engine then skips every
/// recording call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub enabled: bool,

    /// OTLP/HTTP collector endpoint, including the `/v1/metrics` path
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_export_interval_secs")]
    pub export_interval_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:4318/v1/metrics".to_string()
}

const fn default_export_interval_secs() -> u64 {
    60
}

impl MetricsConfig {
    #[must_use]
    pub const fn export_interval(&self) -> Duration {
        Duration::from_secs(self.export_interval_secs)
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            export_interval_secs: default_export_interval_secs(),
        }
    }
}
