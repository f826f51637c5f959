//! Rate Limiting Infrastructure
//!
//! Fixed-window admission control keyed by (client, endpoint).
//!
//! ## Algorithm
//! Each key owns a counter and the instant its window ends. The first
//! request after the window ends starts a new window. Every attempt is
//! counted, admitted or not. A burst straddling a window boundary can admit
//! up to `2 × max_requests`; this approximation keeps memory and decision
//! time O(1) per key.
//!
//! ## Concurrency
//! Counters live in a sharded [`DashMap`]. The check-reset-increment-compare
//! sequence for one key runs while holding that key's shard write lock, so
//! concurrent requests for the same key are linearized with no lost updates.
//! The lock is released before the decision is returned.

use dashmap::DashMap;
use std::collections::HashMap;
use std::time::Duration;

/// Longest accepted window (30 days)
pub const MAX_WINDOW_SECS: u64 = 30 * 24 * 3600;

/// Admission policy for one endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionPolicy {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl AdmissionPolicy {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Window length in milliseconds, saturating at `i64::MAX`
    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Error parsing a policy override list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyParseError {
    #[error("Malformed policy entry `{0}`, expected `endpoint=max/window_secs`")]
    Malformed(String),
    #[error("Policy for `{0}` has a zero-length window")]
    ZeroWindow(String),
    #[error("Policy for `{0}` has a window longer than {max}s", max = MAX_WINDOW_SECS)]
    WindowTooLong(String),
}

/// Endpoint → admission policy, with a default for unlisted endpoints
#[derive(Debug, Clone)]
pub struct PolicyTable {
    default: AdmissionPolicy,
    overrides: HashMap<String, AdmissionPolicy>,
}

impl Default for PolicyTable {
    /// Default table: 100/min overall, stricter limits on login and sign-up
    fn default() -> Self {
        Self::new(AdmissionPolicy::default())
            .with_override("/users/login", AdmissionPolicy::new(5, 60))
            .with_override("/users/", AdmissionPolicy::new(10, 60))
    }
}

impl PolicyTable {
    /// Empty table that applies `default` everywhere
    pub fn new(default: AdmissionPolicy) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Replace the policy used for unlisted endpoints
    pub fn with_default(mut self, policy: AdmissionPolicy) -> Self {
        self.default = policy;
        self
    }

    pub fn with_override(mut self, endpoint_key: impl Into<String>, policy: AdmissionPolicy) -> Self {
        self.overrides.insert(endpoint_key.into(), policy);
        self
    }

    /// Parse overrides of the form `/users/login=5/60,/users/=10/60`
    pub fn parse_overrides(
        default: AdmissionPolicy,
        raw: &str,
    ) -> Result<Self, PolicyParseError> {
        let mut table = Self::new(default);
        for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let malformed = || PolicyParseError::Malformed(entry.to_string());

            let (endpoint, limits) = entry.rsplit_once('=').ok_or_else(malformed)?;
            let (max, window) = limits.split_once('/').ok_or_else(malformed)?;
            let endpoint = endpoint.trim();
            if endpoint.is_empty() {
                return Err(malformed());
            }

            let max_requests: u32 = max.trim().parse().map_err(|_| malformed())?;
            let window_secs: u64 = window.trim().parse().map_err(|_| malformed())?;
            if window_secs == 0 {
                return Err(PolicyParseError::ZeroWindow(endpoint.to_string()));
            }
            if window_secs > MAX_WINDOW_SECS {
                return Err(PolicyParseError::WindowTooLong(endpoint.to_string()));
            }

            table
                .overrides
                .insert(endpoint.to_string(), AdmissionPolicy::new(max_requests, window_secs));
        }
        Ok(table)
    }

    /// Policy for `endpoint_key`, falling back to the default
    pub fn resolve(&self, endpoint_key: &str) -> &AdmissionPolicy {
        self.overrides.get(endpoint_key).unwrap_or(&self.default)
    }

    pub fn default_policy(&self) -> &AdmissionPolicy {
        &self.default
    }
}

/// Rate limit decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted {
        /// Requests left in the current window
        remaining: u32,
        /// When the current window ends (Unix ms)
        reset_at_ms: i64,
    },
    Throttled {
        /// Whole seconds until the window ends, never zero
        retry_after_secs: u64,
    },
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    #[error("Missing client key")]
    MissingClientKey,
}

#[derive(Debug, Clone, Copy)]
struct CounterEntry {
    count: u32,
    window_reset_at_ms: i64,
}

/// Fixed-window rate limiter
///
/// Constructed once per process and shared by handle; tests create isolated
/// instances.
#[derive(Debug)]
pub struct RateLimiter {
    policies: PolicyTable,
    counters: DashMap<(String, String), CounterEntry>,
}

impl RateLimiter {
    pub fn new(policies: PolicyTable) -> Self {
        Self {
            policies,
            counters: DashMap::new(),
        }
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    /// Count one request for `(client_key, endpoint_key)` at `now_ms` and decide
    pub fn admit(
        &self,
        client_key: &str,
        endpoint_key: &str,
        now_ms: i64,
    ) -> Result<Admission, RateLimitError> {
        if client_key.is_empty() {
            return Err(RateLimitError::MissingClientKey);
        }

        let policy = *self.policies.resolve(endpoint_key);
        let window_ms = policy.window_ms();

        let (count, reset_at_ms) = {
            let mut entry = self
                .counters
                .entry((client_key.to_string(), endpoint_key.to_string()))
                .or_insert_with(|| CounterEntry {
                    count: 0,
                    window_reset_at_ms: now_ms.saturating_add(window_ms),
                });

            if now_ms > entry.window_reset_at_ms {
                entry.count = 0;
                entry.window_reset_at_ms = now_ms.saturating_add(window_ms);
            }
            entry.count = entry.count.saturating_add(1);

            (entry.count, entry.window_reset_at_ms)
        };

        if count > policy.max_requests {
            let remaining_ms = u64::try_from(reset_at_ms.saturating_sub(now_ms)).unwrap_or(0);
            let retry_after_secs = remaining_ms.div_ceil(1000).max(1);
            tracing::warn!(
                client = client_key,
                endpoint = endpoint_key,
                count,
                max = policy.max_requests,
                retry_after_secs,
                "Rate limit exceeded"
            );
            return Ok(Admission::Throttled { retry_after_secs });
        }

        Ok(Admission::Admitted {
            remaining: policy.max_requests - count,
            reset_at_ms,
        })
    }

    /// Drop entries whose window has ended; returns how many were removed
    ///
    /// A removed entry is recreated on its next request exactly as a stale
    /// entry would have been reset, so purging never changes a decision.
    pub fn purge_stale(&self, now_ms: i64) -> usize {
        let before = self.counters.len();
        self.counters
            .retain(|_, entry| now_ms <= entry.window_reset_at_ms);
        before.saturating_sub(self.counters.len())
    }

    /// Number of tracked (client, endpoint) pairs
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}
