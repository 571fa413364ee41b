//! Dispatch engine metrics
//!
//! Tracks outbound message dispatch including:
//! - Provider attempts by provider and outcome
//! - Messages delivered, failed, rate limited and suppressed as duplicates
//! - End-to-end dispatch durations

use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};

/// Dispatch metrics collector
#[derive(Debug)]
pub struct DispatchMetrics {
    /// Total number of provider attempts by provider and outcome
    attempts_total: Counter<u64>,

    /// Total number of messages delivered successfully
    messages_delivered: Counter<u64>,

    /// Total number of messages for which every provider failed
    messages_failed: Counter<u64>,

    /// Total number of sends rejected by the per-recipient rate limiter
    rate_limited: Counter<u64>,

    /// Total number of sends suppressed because the message was already delivered
    duplicates_suppressed: Counter<u64>,

    /// Distribution of end-to-end dispatch durations
    duration_seconds: Histogram<f64>,
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchMetrics {
    /// Create a new dispatch metrics collector on the global meter provider
    #[must_use]
    pub fn new() -> Self {
        let meter = meter();

        Self {
            attempts_total: meter
                .u64_counter("courier.dispatch.attempts.total")
                .with_description("Total number of provider attempts by provider and outcome")
                .build(),
            messages_delivered: meter
                .u64_counter("courier.dispatch.messages.delivered.total")
                .with_description("Total number of messages delivered successfully")
                .build(),
            messages_failed: meter
                .u64_counter("courier.dispatch.messages.failed.total")
                .with_description("Total number of messages for which every provider failed")
                .build(),
            rate_limited: meter
                .u64_counter("courier.dispatch.rate_limited.total")
                .with_description("Total number of sends rejected by the rate limiter")
                .build(),
            duplicates_suppressed: meter
                .u64_counter("courier.dispatch.duplicates.total")
                .with_description("Total number of sends suppressed as already delivered")
                .build(),
            duration_seconds: meter
                .f64_histogram("courier.dispatch.duration.seconds")
                .with_description("Distribution of end-to-end dispatch durations")
                .build(),
        }
    }

    /// Record a single provider attempt
    pub fn record_attempt(&self, provider: &str, outcome: &str) {
        let attributes = [
            KeyValue::new("provider", provider.to_string()),
            KeyValue::new("outcome", outcome.to_string()),
        ];
        self.attempts_total.add(1, &attributes);
    }

    /// Record a successful delivery
    pub fn record_delivered(&self, provider: &str, duration_secs: f64) {
        let attributes = [KeyValue::new("provider", provider.to_string())];
        self.messages_delivered.add(1, &attributes);
        self.duration_seconds.record(duration_secs, &attributes);
    }

    /// Record a message for which every provider failed
    pub fn record_failed(&self, duration_secs: f64) {
        self.messages_failed.add(1, &[]);
        self.duration_seconds
            .record(duration_secs, &[KeyValue::new("provider", "none")]);
    }

    /// Record a send rejected by the rate limiter
    pub fn record_rate_limited(&self) {
        self.rate_limited.add(1, &[]);
    }

    /// Record a send suppressed as a duplicate
    pub fn record_duplicate(&self) {
        self.duplicates_suppressed.add(1, &[]);
    }
}

fn meter() -> Meter {
    opentelemetry::global::meter("courier")
}
