//! Scripted delivery providers for dispatch tests
//!
//! Every provider appends its name to a shared call log on each invocation,
//! so tests can assert both how often and in which order providers ran.
#![allow(dead_code)] // Test utility module - not all helpers used in every test

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use courier_dispatch::{DeliveryProvider, Message, ProviderError, SharedProvider};
use parking_lot::Mutex;

/// Shared, ordered record of provider invocations
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, name: &str) {
        self.0.lock().push(name.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    pub fn count(&self, name: &str) -> usize {
        self.0.lock().iter().filter(|call| *call == name).count()
    }
}

/// What a scripted provider does on each call
#[derive(Debug, Clone)]
pub enum Script {
    Succeed,
    Decline,
    Error(ProviderError),
    /// Decline the first `n` calls, then succeed
    DeclineTimes(usize),
    /// Sleep for the given duration, then succeed
    Hang(Duration),
}

pub struct ScriptedProvider {
    name: String,
    script: Script,
    calls: AtomicUsize,
    log: CallLog,
}

impl ScriptedProvider {
    pub fn shared(name: &str, script: Script, log: &CallLog) -> SharedProvider {
        Arc::new(Self {
            name: name.to_string(),
            script,
            calls: AtomicUsize::new(0),
            log: log.clone(),
        })
    }
}

#[async_trait]
impl DeliveryProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn attempt_delivery(&self, _message: &Message) -> Result<bool, ProviderError> {
        self.log.push(&self.name);
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        match &self.script {
            Script::Succeed => Ok(true),
            Script::Decline => Ok(false),
            Script::Error(error) => Err(error.clone()),
            Script::DeclineTimes(n) => Ok(call >= *n),
            Script::Hang(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(true)
            }
        }
    }
}

pub fn message() -> Message {
    Message::new("test@example.com", "Test Email", "This is a test email.")
}
