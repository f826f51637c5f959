//! Presentation Layer
//!
//! axum middleware, handlers and router wiring for the edge layer.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
