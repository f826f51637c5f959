//! Infrastructure Layer
//!
//! Background maintenance for in-process state.

pub mod sweeper;
