//! Signing Secret Value Object
//!
//! Process-wide HS256 key. Loaded once at startup and never rotated.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// HMAC key shared by the token issuer and authenticator
///
/// ## Security
/// - Zeroized on drop
/// - Does not implement `Clone`; share it behind an `Arc`
/// - Debug output is redacted
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningSecret([REDACTED; {} bytes])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let secret = SigningSecret::new("super-secret-value");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("super-secret-value"));
        assert!(debug.contains("18 bytes"));
    }
}
