//! Configurable delivery providers
//!
//! These stand in for real backends: each one follows a fixed [`Behaviour`]
//! so a configuration file can describe exactly how a dispatch run should go.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use async_trait::async_trait;
use courier_common::outgoing;
use courier_dispatch::{DeliveryProvider, Message, ProviderError, SharedProvider};
use serde::{Deserialize, Serialize};

/// How a [`ScriptedProvider`] answers each delivery attempt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behaviour {
    #[default]
    AlwaysSucceed,
    /// Decline every message
    AlwaysFail,
    /// Raise a provider error with the given text
    AlwaysError(String),
    /// Decline the first `n` attempts, then succeed
    FailTimes(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSpec {
    pub name: String,
    #[serde(default)]
    pub behaviour: Behaviour,
}

impl ProviderSpec {
    pub fn new(name: impl Into<String>, behaviour: Behaviour) -> Self {
        Self {
            name: name.into(),
            behaviour,
        }
    }
}

/// A primary provider that always declines, backed by one that always accepts
pub fn default_providers() -> Vec<ProviderSpec> {
    vec![
        ProviderSpec::new("MockEmailProvider1", Behaviour::AlwaysFail),
        ProviderSpec::new("MockEmailProvider2", Behaviour::AlwaysSucceed),
    ]
}

/// Instantiate `specs`, preserving their order.
pub fn build(specs: &[ProviderSpec]) -> Vec<SharedProvider> {
    specs
        .iter()
        .map(|spec| Arc::new(ScriptedProvider::from(spec.clone())) as SharedProvider)
        .collect()
}

#[derive(Debug)]
pub struct ScriptedProvider {
    name: String,
    behaviour: Behaviour,
    attempts: AtomicU32,
}

impl ScriptedProvider {
    /// Number of delivery attempts this provider has seen
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Relaxed)
    }
}

impl From<ProviderSpec> for ScriptedProvider {
    fn from(spec: ProviderSpec) -> Self {
        Self {
            name: spec.name,
            behaviour: spec.behaviour,
            attempts: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl DeliveryProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt_delivery(&self, message: &Message) -> Result<bool, ProviderError> {
        let seen = self.attempts.fetch_add(1, Ordering::Relaxed);
        outgoing!(
            level = INFO,
            "{} sending email to {}",
            self.name,
            message.recipient
        );

        match &self.behaviour {
            Behaviour::AlwaysSucceed => Ok(true),
            Behaviour::AlwaysFail => Ok(false),
            Behaviour::AlwaysError(reason) => Err(ProviderError::Internal(reason.clone())),
            Behaviour::FailTimes(n) => Ok(seen >= *n),
        }
    }
}
