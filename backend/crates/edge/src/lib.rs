//! Edge Protection Layer
//!
//! Clean Architecture structure:
//! - `domain/` - Principal, signing secret, token claims
//! - `application/` - Rate check, token verification, error normalization, chain
//! - `infra/` - Background maintenance of in-process state
//! - `presentation/` - axum middleware, handlers and router
//!
//! ## Security Model
//! - Every request is counted before any credential work is done
//! - Tokens are HS256 only; the `alg` header is pinned, never negotiated
//! - Invalid and expired credentials are distinguishable to the caller
//! - Server-side failure detail only ever reaches the log

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::{
    AuthRequirement, EdgeChain, EdgeConfig, EdgeRequest, TokenAuthenticator, TokenIssuer,
};
pub use domain::{principal::Principal, signing_secret::SigningSecret, token::Verification};
pub use error::{ConfigError, EdgeError, EdgeResult};
pub use infra::sweeper::spawn_stale_sweeper;
pub use presentation::router::{edge_router, guard_routes};
