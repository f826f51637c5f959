//! Application Layer - Use Cases
//!
//! This layer orchestrates the edge pipeline:
//! rate check, token verification, downstream call, outcome normalization.

pub mod chain;
pub mod config;
pub mod issue_token;
pub mod normalize;
pub mod verify_token;

pub use chain::{AuthRequirement, EdgeChain, EdgeRequest};
pub use config::EdgeConfig;
pub use issue_token::TokenIssuer;
pub use verify_token::TokenAuthenticator;
