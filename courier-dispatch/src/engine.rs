//! The dispatch engine.
//!
//! A send moves through these states:
//!
//! ```text
//!            ┌─────────────┐ limited   ┌─────────────┐
//!  send ───> │ rate limit  │ ────────> │ RateLimited │ (false)
//!            └─────────────┘           └─────────────┘
//!                   │ admitted
//!                   v
//!            ┌─────────────┐ completed ┌─────────────┐
//!            │ idempotency │ ────────> │ AlreadySent │ (true)
//!            └─────────────┘           └─────────────┘
//!                   │ new
//!                   v
//!     ┌──> Dispatching(provider, attempt) ──success──> Delivered (true)
//!     │             │ failure
//!     └── backoff ──┤
//!                   │ every provider exhausted
//!                   v
//!               AllFailed (false)
//! ```

use courier_common::{
    DispatchStatus, IdempotencyKey, Message, internal, outgoing,
    status::{ALL_PROVIDERS_FAILED, ALREADY_SENT, RATE_LIMIT_EXCEEDED},
    tracing::{debug, error, info, warn},
};
use tokio::time::Instant;

use crate::{
    DispatchConfig, DispatchError, DispatchQueryService, IdempotencyLedger, ProviderError,
    RateLimiter, StatusLedger,
    policy::RetryPolicy,
    provider::{DeliveryProvider, SharedProvider},
};

/// Orchestrates rate limiting, idempotency, retries and provider fallback.
///
/// The engine owns its rate limit records, idempotency ledger and status
/// ledger; it only holds shared references to the providers. It is `Sync`
/// and meant to be shared (e.g. behind an `Arc`) between concurrent senders.
pub struct DispatchEngine {
    providers: Vec<SharedProvider>,
    config: DispatchConfig,
    retry: RetryPolicy,
    rate_limiter: RateLimiter,
    idempotency: IdempotencyLedger,
    ledger: StatusLedger,
}

impl std::fmt::Debug for DispatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchEngine")
            .field("providers", &self.provider_names())
            .field("config", &self.config)
            .field("statuses", &self.ledger.len())
            .finish_non_exhaustive()
    }
}

impl DispatchEngine {
    /// Build an engine over `providers`, tried in the given order.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails validation.
    pub fn new(
        providers: Vec<SharedProvider>,
        config: DispatchConfig,
    ) -> Result<Self, DispatchError> {
        config.validate()?;

        Ok(Self {
            providers,
            retry: config.retry_policy(),
            rate_limiter: RateLimiter::new(config.rate_limit),
            idempotency: IdempotencyLedger::new(),
            ledger: StatusLedger::new(),
            config,
        })
    }

    /// Build an engine over `providers` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the default configuration fails validation.
    pub fn with_providers(
        providers: impl IntoIterator<Item = SharedProvider>,
    ) -> Result<Self, DispatchError> {
        Self::new(providers.into_iter().collect(), DispatchConfig::default())
    }

    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Provider names in fallback order
    #[must_use]
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    #[must_use]
    pub const fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    #[must_use]
    pub const fn idempotency(&self) -> &IdempotencyLedger {
        &self.idempotency
    }

    /// Send a message assembled from its parts. See [`Self::send`].
    pub async fn send_email(&self, recipient: &str, subject: &str, body: &str) -> bool {
        self.send(&Message::new(recipient, subject, body)).await
    }

    /// Dispatch `message`, returning whether it is (now or previously) delivered.
    ///
    /// Never fails: provider errors, rate limiting and exhaustion all end up
    /// as a `false` return plus status records.
    #[tracing::instrument(level = "debug", skip_all, fields(recipient = %message.recipient))]
    pub async fn send(&self, message: &Message) -> bool {
        if self.rate_limiter.is_rate_limited(&message.recipient) {
            warn!(recipient = %message.recipient, "Rate limit exceeded, message not dispatched");
            self.ledger.record(
                DispatchStatus::new(
                    message,
                    self.retry.reported_attempts(0),
                    false,
                    RATE_LIMIT_EXCEEDED,
                )
                .with_error(Some(RATE_LIMIT_EXCEEDED.to_string())),
            );
            if let Some(metrics) = courier_metrics::try_metrics() {
                metrics.dispatch.record_rate_limited();
            }
            return false;
        }

        let key = message.idempotency_key();
        let _guard = self.idempotency.lock(&key).await;

        if self.idempotency.has_completed(&key) {
            info!(key = %key, "Message already sent, skipping dispatch");
            self.ledger.record(DispatchStatus::new(
                message,
                self.retry.reported_attempts(0),
                true,
                ALREADY_SENT,
            ));
            if let Some(metrics) = courier_metrics::try_metrics() {
                metrics.dispatch.record_duplicate();
            }
            return true;
        }

        self.dispatch(message, key).await
    }

    /// Walk the providers in order until one accepts `message`.
    async fn dispatch(&self, message: &Message, key: IdempotencyKey) -> bool {
        let started = Instant::now();
        let retry_limit = self.retry.retry_limit;
        let mut invocations = 0u32;
        let mut last_error = None;

        for (index, provider) in self.providers.iter().enumerate() {
            let final_provider = index + 1 == self.providers.len();

            for attempt in 1..=retry_limit {
                invocations += 1;
                outgoing!(
                    "Attempt {} of {} with {} to {}",
                    attempt,
                    retry_limit,
                    provider.name(),
                    message.recipient
                );

                match self.attempt(provider.as_ref(), message).await {
                    Ok(true) => {
                        info!(
                            provider = provider.name(),
                            attempt,
                            recipient = %message.recipient,
                            "Message delivered"
                        );
                        self.ledger.record(DispatchStatus::new(
                            message,
                            self.retry.reported_attempts(attempt),
                            true,
                            provider.name(),
                        ));
                        self.idempotency.mark_completed(key);
                        if let Some(metrics) = courier_metrics::try_metrics() {
                            metrics.dispatch.record_attempt(provider.name(), "success");
                            metrics
                                .dispatch
                                .record_delivered(provider.name(), started.elapsed().as_secs_f64());
                        }
                        return true;
                    }
                    Ok(false) => {
                        warn!(provider = provider.name(), attempt, "Provider declined message");
                        last_error = None;
                        self.record_failed_attempt(message, provider.name(), attempt, None);
                    }
                    Err(e) => {
                        warn!(provider = provider.name(), attempt, error = %e, "Provider raised an error");
                        let text = e.to_string();
                        self.record_failed_attempt(message, provider.name(), attempt, Some(text.clone()));
                        last_error = Some(text);
                    }
                }

                if final_provider && self.retry.is_final_attempt(attempt) {
                    break;
                }

                let delay = self.config.backoff.compute_delay(attempt);
                debug!(
                    provider = provider.name(),
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying after backoff"
                );
                tokio::time::sleep(delay).await;
            }

            warn!(
                provider = provider.name(),
                attempts = retry_limit,
                "Provider exhausted its retry budget"
            );
        }

        error!(
            recipient = %message.recipient,
            providers = self.providers.len(),
            invocations,
            "All providers failed"
        );
        self.ledger.record(
            DispatchStatus::new(
                message,
                self.retry.reported_attempts(invocations),
                false,
                ALL_PROVIDERS_FAILED,
            )
            .with_error(last_error),
        );
        if let Some(metrics) = courier_metrics::try_metrics() {
            metrics.dispatch.record_failed(started.elapsed().as_secs_f64());
        }

        false
    }

    /// One provider call, bounded by the per-attempt timeout when configured.
    async fn attempt(
        &self,
        provider: &dyn DeliveryProvider,
        message: &Message,
    ) -> Result<bool, ProviderError> {
        match self.config.attempt_timeout() {
            Some(limit) => tokio::time::timeout(limit, provider.attempt_delivery(message))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::Timeout {
                        after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    })
                }),
            None => provider.attempt_delivery(message).await,
        }
    }

    fn record_failed_attempt(
        &self,
        message: &Message,
        provider: &str,
        attempt: u32,
        error: Option<String>,
    ) {
        self.ledger.record(
            DispatchStatus::new(message, self.retry.reported_attempts(attempt), false, provider)
                .with_error(error),
        );
        if let Some(metrics) = courier_metrics::try_metrics() {
            metrics.dispatch.record_attempt(provider, "failure");
        }
    }

    /// Snapshot of every status record in insertion order
    #[must_use]
    pub fn statuses(&self) -> Vec<DispatchStatus> {
        self.ledger.all()
    }

    /// Drop rate limit records whose window has elapsed.
    pub fn purge_rate_limits(&self) -> usize {
        let removed = self.rate_limiter.purge_expired();
        internal!(
            "Rate limit sweep removed {} records, {} remain",
            removed,
            self.rate_limiter.tracked_recipients()
        );
        removed
    }
}

impl DispatchQueryService for DispatchEngine {
    fn statuses(&self) -> Vec<DispatchStatus> {
        self.ledger.all()
    }

    fn status_count(&self) -> usize {
        self.ledger.len()
    }

    fn statuses_for(&self, recipient: &str) -> Vec<DispatchStatus> {
        self.ledger.for_recipient(recipient)
    }

    fn tracked_recipients(&self) -> usize {
        self.rate_limiter.tracked_recipients()
    }
}
