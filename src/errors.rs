use thiserror::Error;

/// Everything that can fail during a refresh cycle
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("failed to load credentials from {path}: {reason}")]
    CredentialsLoad { path: String, reason: String },

    #[error("token request rejected with status {status}: {message}")]
    Auth { status: u16, message: String },

    #[error("data query rejected with status {status}: {message}")]
    DataFetch { status: u16, message: String },

    #[error("unexpected cloud response: {0}")]
    InvalidResponse(String),

    #[error("no access token in session")]
    TokenMissing,
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
