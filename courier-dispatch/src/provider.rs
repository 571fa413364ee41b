//! The delivery provider capability.
//!
//! Providers are opaque to the engine: it knows their name and can ask them
//! to attempt a delivery, nothing more. Transport details (SMTP, HTTP API,
//! ...) live entirely in the embedding application.

use std::sync::Arc;

use async_trait::async_trait;
use courier_common::Message;

use crate::ProviderError;

/// A named backend able to attempt delivery of a message.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use courier_dispatch::{DeliveryProvider, Message, ProviderError};
///
/// struct Null;
///
/// #[async_trait]
/// impl DeliveryProvider for Null {
///     fn name(&self) -> &str {
///         "Null"
///     }
///
///     async fn attempt_delivery(&self, _message: &Message) -> Result<bool, ProviderError> {
///         Ok(true)
///     }
/// }
/// ```
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    /// Name used to attribute status records to this provider.
    fn name(&self) -> &str;

    /// Attempt to deliver `message`.
    ///
    /// `Ok(true)` means the backend accepted the message, `Ok(false)` that it
    /// declined. An `Err` is treated as a declined attempt whose error text is
    /// recorded.
    async fn attempt_delivery(&self, message: &Message) -> Result<bool, ProviderError>;
}

/// Shared trait object wrapper.
pub type SharedProvider = Arc<dyn DeliveryProvider>;
