//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, base64url)
//! - Injectable time source
//! - Client identification from request headers
//! - Fixed-window rate limiting

pub mod client;
pub mod clock;
pub mod crypto;
pub mod rate_limit;
