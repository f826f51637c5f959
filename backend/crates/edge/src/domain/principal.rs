//! Principal Value Object

use derive_more::Display;

/// Authenticated caller identity extracted from a verified credential
///
/// Request-scoped: it is inserted into the request extensions after
/// verification and dropped with the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct Principal(i64);

impl Principal {
    pub fn new(user_id: i64) -> Self {
        Self(user_id)
    }

    pub fn user_id(&self) -> i64 {
        self.0
    }
}
