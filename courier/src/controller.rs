use std::{path::Path, sync::Arc, time::Duration};

use courier_common::{DispatchStatus, Message, internal, logging};
use courier_dispatch::{DispatchConfig, DispatchEngine, DispatchError};
use courier_metrics::MetricsConfig;
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::providers::{self, ProviderSpec};

/// Top level configuration, read from `courier.config.ron`
#[derive(Debug, Clone, Deserialize)]
pub struct Courier {
    #[serde(default)]
    dispatch: DispatchConfig,
    #[serde(alias = "provider", default = "providers::default_providers")]
    providers: Vec<ProviderSpec>,
    #[serde(default)]
    metrics: MetricsConfig,
    #[serde(alias = "message", default = "default_messages")]
    messages: Vec<Message>,
    /// Seconds between sweeps of expired rate limit records
    #[serde(default)]
    sweep_interval_secs: Option<u64>,
}

fn default_messages() -> Vec<Message> {
    vec![Message::new(
        "test@example.com",
        "Test Email",
        "This is a test email.",
    )]
}

impl Default for Courier {
    fn default() -> Self {
        Self {
            dispatch: DispatchConfig::default(),
            providers: providers::default_providers(),
            metrics: MetricsConfig::default(),
            messages: default_messages(),
            sweep_interval_secs: None,
        }
    }
}

/// Outcome of a dispatch run
#[derive(Debug, Clone)]
pub struct Report {
    pub statuses: Vec<DispatchStatus>,
    pub delivered: usize,
    pub failed: usize,
}

impl Report {
    pub const fn all_delivered(&self) -> bool {
        self.failed == 0
    }

    /// Render the status ledger as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if a status record cannot be serialized.
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(&self.statuses, ron::ser::PrettyConfig::default())
    }
}

impl Courier {
    /// Load a configuration from a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config from {}: {}", path.display(), e)
        })?;

        ron::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config in {}: {}", path.display(), e))
    }

    /// Replace the configured messages, e.g. with one given on the command line.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Build the dispatch engine this configuration describes
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch configuration is invalid.
    pub fn engine(&self) -> Result<DispatchEngine, DispatchError> {
        DispatchEngine::new(providers::build(&self.providers), self.dispatch.clone())
    }

    /// Dispatch every configured message, in order
    ///
    /// # Errors
    ///
    /// This function will return an error if metrics fail to initialise or the
    /// dispatch configuration is invalid. Undelivered messages are not errors;
    /// they are counted in the returned [`Report`].
    pub async fn run(self) -> anyhow::Result<Report> {
        logging::init();
        courier_metrics::init_metrics(&self.metrics)?;

        let engine = Arc::new(self.engine()?);
        internal!(
            level = INFO,
            "Dispatching {} messages via {:?}",
            self.messages.len(),
            engine.provider_names()
        );

        let sweeper = self
            .sweep_interval_secs
            .filter(|secs| *secs > 0)
            .map(|secs| sweep(Arc::clone(&engine), Duration::from_secs(secs)));

        let mut delivered = 0;
        for message in &self.messages {
            if engine.send(message).await {
                delivered += 1;
            } else {
                tracing::warn!(recipient = %message.recipient, "Message was not delivered");
            }
        }

        if let Some(sweeper) = sweeper {
            sweeper.abort();
        }

        let report = Report {
            statuses: engine.statuses(),
            delivered,
            failed: self.messages.len() - delivered,
        };

        internal!(
            level = INFO,
            "Dispatch finished: {} delivered, {} failed",
            report.delivered,
            report.failed
        );

        Ok(report)
    }
}

/// Periodically drop expired rate limit records until aborted.
fn sweep(engine: Arc<DispatchEngine>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            engine.purge_rate_limits();
        }
    })
}
