//! Per-client admission control
//!
//! Sliding window rate limiting keyed by client identity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

#[cfg(test)]
use mockall::automock;

use crate::config::RateLimitSettings;

/// Outcome of an admission check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request is allowed
    pub allowed: bool,
    /// Remaining requests in the current window
    pub remaining: u32,
    /// Total limit for the window
    pub limit: u32,
    /// Seconds until a denied client may retry (0 when allowed)
    pub retry_after_secs: u64,
}

impl RateLimitDecision {
    pub fn allow(limit: u32, remaining: u32) -> Self {
        Self {
            allowed: true,
            remaining,
            limit,
            retry_after_secs: 0,
        }
    }

    pub fn deny(limit: u32, retry_after_secs: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            limit,
            retry_after_secs,
        }
    }
}

/// Decides whether a client may start a generation
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AdmissionControl: Send + Sync + std::fmt::Debug {
    /// Check the client and, when admitted, count the request
    async fn check(&self, client_id: &str) -> RateLimitDecision;
}

/// Sliding window rate limiter
#[derive(Debug)]
pub struct SlidingWindowRateLimiter {
    /// Per-client admitted request timestamps
    records: Arc<RwLock<HashMap<String, Vec<Instant>>>>,
    limit: u32,
    window: Duration,
    cleanup_interval: Duration,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl SlidingWindowRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            limit,
            window,
            cleanup_interval: Duration::from_secs(300),
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    pub fn from_settings(settings: &RateLimitSettings) -> Self {
        Self::new(settings.requests, Duration::from_secs(settings.window_secs))
    }

    /// Reset the window for a client
    pub async fn reset(&self, client_id: &str) {
        self.records.write().await.remove(client_id);
    }

    /// Number of clients currently tracked
    pub async fn tracked_clients(&self) -> usize {
        self.records.read().await.len()
    }

    fn decide(&self, timestamps: &[Instant], now: Instant) -> RateLimitDecision {
        let window_start = now.checked_sub(self.window).unwrap_or(now);
        let in_window: Vec<Instant> = timestamps
            .iter()
            .copied()
            .filter(|t| *t > window_start)
            .collect();
        let count = in_window.len() as u32;

        if count >= self.limit {
            let retry_after = in_window
                .iter()
                .min()
                .map(|oldest| {
                    let expires_in = self.window.saturating_sub(now.duration_since(*oldest));
                    // round up so a client retrying on time is admitted
                    expires_in.as_secs() + u64::from(expires_in.subsec_nanos() > 0)
                })
                .unwrap_or_else(|| self.window.as_secs());

            return RateLimitDecision::deny(self.limit, retry_after.max(1));
        }

        RateLimitDecision::allow(self.limit, self.limit.saturating_sub(count + 1))
    }

    async fn maybe_cleanup(&self) {
        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            last.elapsed() >= self.cleanup_interval
        };

        if should_cleanup {
            let mut last = self.last_cleanup.write().await;
            *last = Instant::now();

            let now = Instant::now();
            let cutoff = now.checked_sub(self.window).unwrap_or(now);

            let mut records = self.records.write().await;
            for timestamps in records.values_mut() {
                timestamps.retain(|t| *t > cutoff);
            }
            records.retain(|_, v| !v.is_empty());
        }
    }
}

#[async_trait]
impl AdmissionControl for SlidingWindowRateLimiter {
    async fn check(&self, client_id: &str) -> RateLimitDecision {
        self.maybe_cleanup().await;

        let now = Instant::now();
        let mut records = self.records.write().await;
        let timestamps = records.entry(client_id.to_string()).or_default();

        let decision = self.decide(timestamps, now);

        if decision.allowed {
            let window_start = now.checked_sub(self.window).unwrap_or(now);
            timestamps.retain(|t| *t > window_start);
            timestamps.push(now);
        } else {
            tracing::debug!(
                client_id = %client_id,
                retry_after_secs = decision.retry_after_secs,
                "Rate limit exceeded"
            );
        }

        decision
    }
}
