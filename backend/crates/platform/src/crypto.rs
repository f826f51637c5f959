//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Encode bytes as unpadded base64url (JWS segment encoding)
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode unpadded base64url to bytes
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Compute HMAC-SHA256 over `data` with a key of any length
pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Verify an HMAC-SHA256 tag in constant time
pub fn verify_hmac_sha256(key: &[u8], data: &[u8], tag: &[u8]) -> bool {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    mac.verify_slice(tag).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_rfc4231_case_2() {
        let mac = hmac_sha256(b"Jefe", b"what do ya want for nothing?");
        let expected =
            hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
                .unwrap();
        assert_eq!(mac.to_vec(), expected);
    }

    #[test]
    fn test_verify_hmac() {
        let key = b"a-signing-secret-of-reasonable-length";
        let tag = hmac_sha256(key, b"payload");
        assert!(verify_hmac_sha256(key, b"payload", &tag));
        assert!(!verify_hmac_sha256(key, b"payload!", &tag));
        assert!(!verify_hmac_sha256(b"other-key", b"payload", &tag));
        assert!(!verify_hmac_sha256(key, b"payload", &tag[..31]));
    }

    #[test]
    fn test_base64url_jws_header() {
        let encoded = to_base64url(br#"{"alg":"HS256","typ":"JWT"}"#);
        assert_eq!(encoded, "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
        assert!(!encoded.contains('='));
    }

    #[test]
    fn test_base64url_rejects_garbage() {
        assert!(from_base64url("not base64!").is_err());
    }
}
