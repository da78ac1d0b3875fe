use thiserror::Error;

/// Codec failures at the persistence boundary.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("envelope is not a shipment (kind {kind:?})")]
    WrongKind { kind: String },
    #[error("envelope carries no confirmed entity id")]
    MissingId,
    #[error("shipment payload failed to decode: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence backend is not configured")]
    NotConfigured,
    #[error("entity envelope codec failed: {0}")]
    Codec(#[from] EnvelopeError),
    #[error("persistence backend failed: {message}")]
    Backend { message: String },
}

impl PersistenceError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Outcome reported to the user when a mutation intent fails. A stale id is
/// not an error; advance and delete ignore those silently.
#[derive(Debug, Error)]
pub enum IntentError {
    #[error("maximum shipment limit reached")]
    CapacityExceeded,
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("email address is required")]
    EmailRequired,
}
