//! Bearer Token Model
//!
//! Credentials are compact HS256 JSON Web Tokens:
//! `base64url(header) . base64url(claims) . base64url(HMAC-SHA256)`.
//! Claims carry the subject as `user_id` and the expiry as `exp`
//! (Unix seconds).

use serde::{Deserialize, Serialize};

use crate::domain::principal::Principal;

/// The only accepted signing algorithm
pub const TOKEN_ALGORITHM: &str = "HS256";

/// JOSE header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        }
    }
}

/// Signed claims
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject identifier
    pub user_id: i64,
    /// Expiry, Unix seconds
    pub exp: i64,
}

impl TokenClaims {
    /// Strictly past expiry; a token is still valid during its `exp` second
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        self.exp < now_secs
    }
}

/// Verification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid(Principal),
    /// Malformed, wrong algorithm, bad signature or unusable claims
    Invalid,
    /// Signature verified but `exp` is in the past
    Expired,
}
