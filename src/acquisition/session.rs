/// Access-token state for the life of the process
use crate::errors::{TelemetryError, TelemetryResult};

/// Single-slot holder for the cloud access token.
///
/// The token is requested at most once and reused for every later cloud
/// query; there is no expiry or refresh handling, and the slot is never
/// persisted. The single-writer property comes from ownership: the refresh
/// loop owns the session and lends it mutably to one cycle at a time.
#[derive(Debug, Default)]
pub struct AuthSession {
    token: Option<String>,
}

impl AuthSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// The stored token. Calling this before `set_token` is a logic error
    /// and fails with `TokenMissing`.
    pub fn token(&self) -> TelemetryResult<&str> {
        self.token.as_deref().ok_or(TelemetryError::TokenMissing)
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }
}
