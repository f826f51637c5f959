//! Edge Chain
//!
//! Per-request orchestration:
//!
//! ```text
//! Pending → RateChecked ─┬→ Throttled                      (terminal)
//!                        └→ Authenticating ─┬→ AuthFailed  (terminal)
//!                                           └→ Authorized → Handling → Responded
//! ```
//!
//! Public endpoints skip `Authenticating`. Rate limiting and verification
//! are synchronous; the only suspension point is the downstream call, and
//! the counter update has already happened by then.

use platform::clock::Clock;
use platform::rate_limit::{Admission, RateLimitError, RateLimiter};
use std::future::Future;
use std::net::IpAddr;
use std::sync::Arc;

use crate::application::config::EdgeConfig;
use crate::application::normalize::normalize;
use crate::application::verify_token::TokenAuthenticator;
use crate::domain::principal::Principal;
use crate::domain::token::Verification;
use crate::error::{EdgeError, EdgeResult};

/// Whether an endpoint requires a bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    Public,
    Bearer,
}

/// The parts of an inbound request the edge layer looks at
#[derive(Debug, Clone, Copy)]
pub struct EdgeRequest<'a> {
    /// Caller network identity
    pub client_key: &'a str,
    /// Logical operation being rate limited
    pub endpoint_key: &'a str,
    /// Raw bearer credential, if presented
    pub bearer: Option<&'a str>,
    pub auth: AuthRequirement,
}

/// Edge chain
pub struct EdgeChain {
    limiter: Arc<RateLimiter>,
    authenticator: TokenAuthenticator,
    clock: Arc<dyn Clock>,
    trusted_proxies: Vec<IpAddr>,
}

impl EdgeChain {
    pub fn new(
        limiter: Arc<RateLimiter>,
        authenticator: TokenAuthenticator,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            limiter,
            authenticator,
            clock,
            trusted_proxies: Vec::new(),
        }
    }

    /// Believe `X-Forwarded-For` when the peer is one of `proxies`
    pub fn with_trusted_proxies(mut self, proxies: Vec<IpAddr>) -> Self {
        self.trusted_proxies = proxies;
        self
    }

    /// Build a chain with a fresh limiter from `config`
    pub fn from_config(config: &EdgeConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(RateLimiter::new(config.policies.clone())),
            TokenAuthenticator::new(config.signing_secret.clone()),
            clock,
        )
        .with_trusted_proxies(config.trusted_proxies.clone())
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn trusted_proxies(&self) -> &[IpAddr] {
        &self.trusted_proxies
    }

    /// Run the full chain around one downstream call
    ///
    /// `next` is only invoked once admission and authentication succeed.
    /// It receives the principal for `Bearer` endpoints and `None` for
    /// `Public` ones.
    pub async fn run<F, Fut, T, E>(&self, request: EdgeRequest<'_>, next: F) -> EdgeResult<T>
    where
        F: FnOnce(Option<Principal>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Into<EdgeError>,
    {
        let principal = self.guard(&request).inspect_err(EdgeError::log)?;
        normalize(next(principal).await)
    }

    /// Rate check followed by authentication where required
    pub fn guard(&self, request: &EdgeRequest<'_>) -> EdgeResult<Option<Principal>> {
        let now_ms = self.clock.now_ms();

        match self
            .limiter
            .admit(request.client_key, request.endpoint_key, now_ms)
        {
            Ok(Admission::Admitted { remaining, .. }) => {
                tracing::debug!(
                    client = request.client_key,
                    endpoint = request.endpoint_key,
                    remaining,
                    "Request admitted"
                );
            }
            Ok(Admission::Throttled { retry_after_secs }) => {
                return Err(EdgeError::RateLimitExceeded { retry_after_secs });
            }
            Err(RateLimitError::MissingClientKey) => return Err(EdgeError::ClientUnidentified),
        }

        if request.auth == AuthRequirement::Public {
            return Ok(None);
        }

        let Some(token) = request.bearer else {
            return Err(EdgeError::CredentialInvalid);
        };

        match self.authenticator.verify(token, now_ms.div_euclid(1000)) {
            Verification::Valid(principal) => Ok(Some(principal)),
            Verification::Invalid => Err(EdgeError::CredentialInvalid),
            Verification::Expired => Err(EdgeError::CredentialExpired),
        }
    }
}
