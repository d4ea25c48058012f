//! Per-request idempotency keys

use std::fmt;

use uuid::Uuid;

/// Fresh UUID v4 attached to one mutating request
///
/// Not `Clone`: a key is moved into the request that consumes it, so the
/// same key cannot be sent twice.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(Uuid);

impl IdempotencyKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First 8 characters, used to name wallet sets
    pub fn name_prefix(&self) -> String {
        self.0.to_string()[..8].to_string()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for IdempotencyKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}
