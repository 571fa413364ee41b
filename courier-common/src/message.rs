//! Logical messages and their deterministic identity.

use core::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// Separator placed between the fields when deriving an [`IdempotencyKey`].
pub const KEY_SEPARATOR: char = '-';

/// A logical message: who it goes to and what it says.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

impl Message {
    pub fn new(
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient: recipient.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The key under which this message is deduplicated.
    #[must_use]
    pub fn idempotency_key(&self) -> IdempotencyKey {
        IdempotencyKey::derive(&self.recipient, &self.subject, &self.body)
    }
}

/// Deterministic identifier for a logical message.
///
/// Two messages with identical recipient, subject and body always produce
/// the same key. Nothing else (time, provider, attempt) feeds into it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    #[must_use]
    pub fn derive(recipient: &str, subject: &str, body: &str) -> Self {
        let mut key = String::with_capacity(recipient.len() + subject.len() + body.len() + 2);
        key.push_str(recipient);
        key.push(KEY_SEPARATOR);
        key.push_str(subject);
        key.push(KEY_SEPARATOR);
        key.push_str(body);
        Self(key)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IdempotencyKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn key_is_plain_concatenation() {
        let key = IdempotencyKey::derive("a@example.com", "Hi", "Body");
        assert_eq!(key.as_str(), "a@example.com-Hi-Body");
    }

    #[test]
    fn identical_content_collapses_to_one_key() {
        let first = Message::new("a@example.com", "Hi", "Body");
        let second = Message::new("a@example.com", "Hi", "Body");
        assert_eq!(first.idempotency_key(), second.idempotency_key());
    }

    #[test]
    fn key_is_order_sensitive() {
        let forward = IdempotencyKey::derive("x", "y", "z");
        let swapped = IdempotencyKey::derive("y", "x", "z");
        assert_ne!(forward, swapped);
    }

    #[test]
    fn key_serializes_as_bare_string() {
        let key = IdempotencyKey::derive("r", "s", "b");
        let encoded = ron::to_string(&key).unwrap();
        assert_eq!(encoded, "\"r-s-b\"");
    }
}
