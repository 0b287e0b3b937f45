use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Method;
use std::time::Duration;

/// Statuses whose `Retry-After` header is honoured.
const RETRY_AFTER_STATUSES: [u16; 2] = [429, 503];

/// Retry behaviour for calls to the n8n API.
///
/// Status-based retries only apply to idempotent methods; a failed connect is
/// retried for every method because the request never reached the server.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub total: u32,
    /// Seconds; the n-th retry waits `factor * 2^(n-1)`, the first waits nothing
    pub backoff_factor: f64,
    pub max_backoff: Duration,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            total: 3,
            backoff_factor: 1.0,
            max_backoff: Duration::from_secs(120),
            status_forcelist: vec![429, 500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    /// Policy with the same retry budget but no waiting, for tests.
    pub fn immediate() -> Self {
        Self {
            backoff_factor: 0.0,
            ..Self::default()
        }
    }

    pub fn is_idempotent(method: &Method) -> bool {
        [
            Method::GET,
            Method::HEAD,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::TRACE,
        ]
        .contains(method)
    }

    pub fn should_retry_status(&self, method: &Method, status: u16) -> bool {
        Self::is_idempotent(method) && self.status_forcelist.contains(&status)
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let secs = self.backoff_factor * 2f64.powi(retry as i32 - 1);
        Duration::from_secs_f64(secs.max(0.0)).min(self.max_backoff)
    }

    /// Server-requested delay, if the response carries a usable `Retry-After`.
    ///
    /// Replaces the computed backoff as-is; `max_backoff` does not apply.
    pub fn retry_after(&self, status: u16, headers: &HeaderMap) -> Option<Duration> {
        if !RETRY_AFTER_STATUSES.contains(&status) {
            return None;
        }
        headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }
}
