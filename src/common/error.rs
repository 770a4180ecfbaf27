use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid granule id: {id}")]
    InvalidGranuleId { id: i64 },

    #[error("Malformed message: {reason}")]
    MalformedMessage { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl DomainError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DomainError::MalformedMessage {
            reason: reason.into(),
        }
    }
}

/// Any closure or failure of the underlying stream. Never fatal: the
/// supervisor always answers it with a delayed reconnect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Send failed: {0}")]
    Send(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),

    #[error("Task failed: {0}")]
    Task(String),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
