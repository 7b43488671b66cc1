use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
    #[error("signing failed: {0}")]
    Signing(String),
    #[error("encryption failed: {0}")]
    Encryption(String),
    #[error("finalized record has no identifier")]
    IdentifierMissing,
    #[error("identifier mismatch: expected {expected}, got {actual}")]
    IdentifierMismatch { expected: String, actual: String },
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("link integrity violation: {0}")]
    LinkIntegrity(String),
    #[error("nostr client error: {0}")]
    NostrClient(#[from] nostr_sdk::client::Error),
    #[error("serde json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing env var: {0}")]
    MissingEnv(&'static str),
    #[error("publish quorum failed: required {required}, got {actual}")]
    Quorum { required: usize, actual: usize },
    #[error("mutex poisoned")]
    MutexPoisoned,
    #[error("operation timed out")]
    Timeout,
}

impl Error {
    /// Whether the error came from delivering a record rather than building it.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::NostrClient(_)
                | Error::Quorum { .. }
                | Error::Timeout
                | Error::MutexPoisoned
        )
    }
}
