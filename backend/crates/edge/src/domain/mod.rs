//! Domain Layer - Credential model
//!
//! This layer contains:
//! - The authenticated principal
//! - The signing secret value object
//! - Token claims and the verification outcome

pub mod principal;
pub mod signing_secret;
pub mod token;
