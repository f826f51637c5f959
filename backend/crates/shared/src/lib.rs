//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the edge
//! layer and every downstream service:
//! - Common error types and result aliases
//! - Error classification mapped to HTTP status codes
//! - Out-of-band failure reports for server-side errors
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all services.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
    pub mod report;
}
