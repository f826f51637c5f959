//! Application Configuration
//!
//! Configuration for the edge layer. There is deliberately no `Default`:
//! the signing secret has no usable fallback and must come from the
//! environment.

use platform::rate_limit::{AdmissionPolicy, MAX_WINDOW_SECS, PolicyTable};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::signing_secret::SigningSecret;
use crate::error::ConfigError;

/// Minimum HS256 key length (RFC 7518 §3.2)
pub const MIN_SECRET_LEN: usize = 32;

/// Longest accepted token lifetime (1 year)
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 3600;

/// Edge configuration
#[derive(Debug, Clone)]
pub struct EdgeConfig {
    /// Secret key for HS256 signing and verification
    pub signing_secret: Arc<SigningSecret>,
    /// Per-endpoint admission policies
    pub policies: PolicyTable,
    /// Lifetime of issued tokens (1 day)
    pub token_ttl: Duration,
    /// Stale counter sweep interval; `None` keeps entries until reused
    pub sweep_interval: Option<Duration>,
    /// Peers whose `X-Forwarded-For` is believed; empty means the peer
    /// address is always the client
    pub trusted_proxies: Vec<IpAddr>,
}

impl EdgeConfig {
    /// Config with default policies around a supplied secret
    pub fn new(signing_secret: SigningSecret) -> Result<Self, ConfigError> {
        if signing_secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: signing_secret.len(),
            });
        }
        Ok(Self {
            signing_secret: Arc::new(signing_secret),
            policies: PolicyTable::default(),
            token_ttl: Duration::from_secs(24 * 3600),
            sweep_interval: None,
            trusted_proxies: Vec::new(),
        })
    }

    /// Load from process environment
    ///
    /// | Variable | Default |
    /// |---|---|
    /// | `JWT_SECRET` | required, at least 32 bytes |
    /// | `RATE_LIMIT_DEFAULT_MAX` | `100` |
    /// | `RATE_LIMIT_DEFAULT_WINDOW_SECS` | `60` |
    /// | `RATE_LIMIT_POLICIES` | `/users/login=5/60,/users/=10/60` |
    /// | `RATE_LIMIT_SWEEP_SECS` | `0` (disabled) |
    /// | `TOKEN_TTL_SECS` | `86400` |
    /// | `TRUSTED_PROXIES` | empty (comma-separated IPs) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let mut config = Self::new(SigningSecret::new(secret.into_bytes()))?;

        let max_requests: u32 = parse_var(&lookup, "RATE_LIMIT_DEFAULT_MAX", 100)?;
        let window_secs: u64 = parse_var(&lookup, "RATE_LIMIT_DEFAULT_WINDOW_SECS", 60)?;
        if window_secs == 0 || window_secs > MAX_WINDOW_SECS {
            return Err(ConfigError::InvalidNumber {
                var: "RATE_LIMIT_DEFAULT_WINDOW_SECS",
                value: window_secs.to_string(),
            });
        }
        let default_policy = AdmissionPolicy::new(max_requests, window_secs);

        config.policies = match lookup("RATE_LIMIT_POLICIES") {
            Some(raw) => PolicyTable::parse_overrides(default_policy, &raw)?,
            None => PolicyTable::default().with_default(default_policy),
        };

        let sweep_secs: u64 = parse_var(&lookup, "RATE_LIMIT_SWEEP_SECS", 0)?;
        config.sweep_interval = (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs));

        let ttl_secs: u64 = parse_var(&lookup, "TOKEN_TTL_SECS", 24 * 3600)?;
        if ttl_secs == 0 || ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidNumber {
                var: "TOKEN_TTL_SECS",
                value: ttl_secs.to_string(),
            });
        }
        config.token_ttl = Duration::from_secs(ttl_secs);

        if let Some(raw) = lookup("TRUSTED_PROXIES") {
            config.trusted_proxies = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<IpAddr>().map_err(|_| ConfigError::InvalidAddress {
                        var: "TRUSTED_PROXIES",
                        value: s.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
        }

        Ok(config)
    }

    /// Get token TTL in seconds
    pub fn token_ttl_secs(&self) -> i64 {
        i64::try_from(self.token_ttl.as_secs()).unwrap_or(i64::MAX)
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}
