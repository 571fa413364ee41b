//! Per-recipient rate limiting using a fixed window counter
//!
//! Each recipient gets a record of how many sends were admitted in the
//! current window and when that window started.
//!
//! # Algorithm
//!
//! - First contact: open a window with a count of one, admit
//! - Inside the window, below the threshold: increment, admit
//! - Inside the window, at the threshold: reject, record left untouched
//! - Window elapsed: open a fresh window with a count of one, admit
//!
//! # Example
//!
//! ```text
//! Limit: 5 per 60s
//! t=0s..10s:  sends 1-5 admitted
//! t=12s:      send 6 rejected (count stays 5)
//! t=61s:      window elapsed, send admitted, count reset to 1
//! ```

use std::time::Duration;

use courier_common::internal;
use dashmap::{DashMap, mapref::entry::Entry};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Configuration for rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Sends admitted per recipient within one window
    #[serde(default = "default_max_per_window")]
    pub max_per_window: u32,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_per_window: default_max_per_window(),
            window_ms: default_window_ms(),
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }
}

const fn default_max_per_window() -> u32 {
    5
}

const fn default_window_ms() -> u64 {
    60_000
}

/// Count of admitted sends within the window opened at `started`
#[derive(Debug, Clone, Copy)]
struct RateWindow {
    count: u32,
    started: Instant,
}

impl RateWindow {
    const fn open(now: Instant) -> Self {
        Self {
            count: 1,
            started: now,
        }
    }

    fn has_elapsed(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.started) >= window
    }
}

/// Per-recipient rate limiter
///
/// Records live in a [`DashMap`], so every read-modify-write of a single
/// recipient's record happens under that entry's shard lock.
#[derive(Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    windows: DashMap<String, RateWindow>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: DashMap::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check whether a send to `recipient` must be rejected, counting it if not.
    ///
    /// A rejected call leaves the recipient's record unchanged.
    pub fn is_rate_limited(&self, recipient: &str) -> bool {
        let now = Instant::now();
        let window = self.config.window();

        match self.windows.entry(recipient.to_owned()) {
            Entry::Vacant(entry) => {
                entry.insert(RateWindow::open(now));
                false
            }
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                if record.has_elapsed(now, window) {
                    *record = RateWindow::open(now);
                    false
                } else if record.count >= self.config.max_per_window {
                    true
                } else {
                    record.count += 1;
                    false
                }
            }
        }
    }

    /// Drop every record whose window has elapsed, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let window = self.config.window();
        let before = self.windows.len();

        self.windows
            .retain(|_, record| !record.has_elapsed(now, window));

        let removed = before.saturating_sub(self.windows.len());
        if removed > 0 {
            internal!(level = DEBUG, "Purged {} expired rate limit windows", removed);
        }
        removed
    }

    /// Number of recipients currently holding a record
    #[must_use]
    pub fn tracked_recipients(&self) -> usize {
        self.windows.len()
    }

    /// Current window state for `recipient`, if it has one
    #[must_use]
    pub fn stats(&self, recipient: &str) -> Option<RateLimitStats> {
        let now = Instant::now();
        let window = self.config.window();

        self.windows.get(recipient).map(|record| RateLimitStats {
            count: record.count,
            limit: self.config.max_per_window,
            window_remaining: window.saturating_sub(now.saturating_duration_since(record.started)),
        })
    }
}

/// Snapshot of one recipient's rate limit window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStats {
    /// Sends admitted in the current window
    pub count: u32,
    /// Sends admitted per window
    pub limit: u32,
    /// Time until the window elapses
    pub window_remaining: Duration,
}
