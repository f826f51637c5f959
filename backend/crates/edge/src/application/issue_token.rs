//! Issue Token Use Case
//!
//! Mints bearer tokens in the exact shape [`TokenAuthenticator`] accepts.
//! The login collaborator calls this after checking a password.
//!
//! [`TokenAuthenticator`]: crate::application::verify_token::TokenAuthenticator

use platform::crypto::{hmac_sha256, to_base64url};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::principal::Principal;
use crate::domain::signing_secret::SigningSecret;
use crate::domain::token::{TokenClaims, TokenHeader};

/// Token issuer
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    secret: Arc<SigningSecret>,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: Arc<SigningSecret>, ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Sign a token for `principal` expiring `ttl` after `now_secs`
    pub fn issue(&self, principal: Principal, now_secs: i64) -> Result<String, serde_json::Error> {
        let claims = TokenClaims {
            user_id: principal.user_id(),
            exp: now_secs.saturating_add(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX)),
        };

        let header = to_base64url(&serde_json::to_vec(&TokenHeader::default())?);
        let payload = to_base64url(&serde_json::to_vec(&claims)?);
        let signing_input = format!("{header}.{payload}");
        let signature = to_base64url(&hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes()));

        tracing::debug!(user_id = claims.user_id, exp = claims.exp, "Issued bearer token");

        Ok(format!("{signing_input}.{signature}"))
    }
}
