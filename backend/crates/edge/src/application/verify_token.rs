//! Verify Token Use Case
//!
//! Stateless bearer-token verification. No revocation list, no replay
//! cache, no refresh: validity is recomputed from the token alone.

use platform::crypto::{from_base64url, verify_hmac_sha256};
use std::sync::Arc;

use crate::domain::principal::Principal;
use crate::domain::signing_secret::SigningSecret;
use crate::domain::token::{TOKEN_ALGORITHM, TokenClaims, TokenHeader, Verification};

/// Token authenticator
#[derive(Debug, Clone)]
pub struct TokenAuthenticator {
    secret: Arc<SigningSecret>,
}

impl TokenAuthenticator {
    pub fn new(secret: Arc<SigningSecret>) -> Self {
        Self { secret }
    }

    /// Verify `token` at `now_secs`
    ///
    /// Expiry is only examined once the signature has verified, so a forged
    /// token is always `Invalid` and never `Expired`.
    pub fn verify(&self, token: &str, now_secs: i64) -> Verification {
        let Some(claims) = self.verified_claims(token) else {
            return Verification::Invalid;
        };

        if claims.is_expired_at(now_secs) {
            return Verification::Expired;
        }

        Verification::Valid(Principal::new(claims.user_id))
    }

    fn verified_claims(&self, token: &str) -> Option<TokenClaims> {
        let (signing_input, signature_b64) = token.rsplit_once('.')?;
        let (header_b64, payload_b64) = signing_input.split_once('.')?;
        if payload_b64.contains('.') {
            return None;
        }

        // Pin the algorithm before touching the signature
        let header: TokenHeader = serde_json::from_slice(&from_base64url(header_b64).ok()?).ok()?;
        if header.alg != TOKEN_ALGORITHM {
            return None;
        }

        let signature = from_base64url(signature_b64).ok()?;
        if !verify_hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes(), &signature) {
            return None;
        }

        serde_json::from_slice(&from_base64url(payload_b64).ok()?).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::issue_token::TokenIssuer;
    use platform::crypto::{hmac_sha256, to_base64url};
    use std::time::Duration;

    const NOW: i64 = 1_700_000_000;

    fn secret() -> Arc<SigningSecret> {
        Arc::new(SigningSecret::new("test-signing-secret-0123456789abcdef"))
    }

    fn sign(secret: &[u8], header: &str, payload: &str) -> String {
        let input = format!("{}.{}", to_base64url(header.as_bytes()), to_base64url(payload.as_bytes()));
        let signature = to_base64url(&hmac_sha256(secret, input.as_bytes()));
        format!("{input}.{signature}")
    }

    #[test]
    fn test_valid_token() {
        let secret = secret();
        let token = TokenIssuer::new(secret.clone(), Duration::from_secs(60))
            .issue(Principal::new(42), NOW)
            .unwrap();

        let verification = TokenAuthenticator::new(secret).verify(&token, NOW + 60);
        assert_eq!(verification, Verification::Valid(Principal::new(42)));
    }

    #[test]
    fn test_expired_token_with_valid_signature() {
        let secret = secret();
        let token = TokenIssuer::new(secret.clone(), Duration::from_secs(60))
            .issue(Principal::new(42), NOW)
            .unwrap();

        let verification = TokenAuthenticator::new(secret).verify(&token, NOW + 61);
        assert_eq!(verification, Verification::Expired);
    }

    #[test]
    fn test_tampered_signature_is_invalid_even_when_expired() {
        let secret = secret();
        let token = sign(
            b"some-other-secret",
            r#"{"alg":"HS256","typ":"JWT"}"#,
            &format!(r#"{{"user_id":1,"exp":{}}}"#, NOW - 3600),
        );

        let verification = TokenAuthenticator::new(secret).verify(&token, NOW);
        assert_eq!(verification, Verification::Invalid);
    }

    #[test]
    fn test_tampered_claims_are_invalid() {
        let secret = secret();
        let token = TokenIssuer::new(secret.clone(), Duration::from_secs(60))
            .issue(Principal::new(1), NOW)
            .unwrap();

        // Swap in claims for another user, keep the original signature
        let mut parts: Vec<&str> = token.split('.').collect();
        let forged = to_base64url(format!(r#"{{"user_id":2,"exp":{}}}"#, NOW + 60).as_bytes());
        parts[1] = &forged;
        let forged_token = parts.join(".");

        let verification = TokenAuthenticator::new(secret).verify(&forged_token, NOW);
        assert_eq!(verification, Verification::Invalid);
    }

    #[test]
    fn test_malformed_tokens() {
        let authenticator = TokenAuthenticator::new(secret());
        for token in ["", "abc", "a.b", "a.b.c.d", "...", "not base64.at.all"] {
            assert_eq!(authenticator.verify(token, NOW), Verification::Invalid, "{token:?}");
        }
    }

    #[test]
    fn test_algorithm_is_pinned() {
        let secret = secret();
        let payload = format!(r#"{{"user_id":1,"exp":{}}}"#, NOW + 60);
        let token = sign(secret.as_bytes(), r#"{"alg":"none"}"#, &payload);

        assert_eq!(
            TokenAuthenticator::new(secret).verify(&token, NOW),
            Verification::Invalid
        );
    }

    #[test]
    fn test_signed_token_with_unusable_claims_is_invalid() {
        let secret = secret();
        let authenticator = TokenAuthenticator::new(secret.clone());

        let no_exp = sign(secret.as_bytes(), r#"{"alg":"HS256"}"#, r#"{"user_id":1}"#);
        let string_id = sign(
            secret.as_bytes(),
            r#"{"alg":"HS256"}"#,
            &format!(r#"{{"user_id":"1","exp":{}}}"#, NOW + 60),
        );

        assert_eq!(authenticator.verify(&no_exp, NOW), Verification::Invalid);
        assert_eq!(authenticator.verify(&string_id, NOW), Verification::Invalid);
    }

    #[test]
    fn test_accepts_tokens_from_other_hs256_signers() {
        // Claims as written by the user service: extra fields, no `typ`
        let secret = secret();
        let token = sign(
            secret.as_bytes(),
            r#"{"typ":"JWT","alg":"HS256"}"#,
            &format!(r#"{{"user_id":9,"exp":{},"iat":{}}}"#, NOW + 10, NOW),
        );

        assert_eq!(
            TokenAuthenticator::new(secret).verify(&token, NOW),
            Verification::Valid(Principal::new(9))
        );
    }
}
