use crate::common::{DomainError, DomainResult};
use serde::de::DeserializeOwned;

/// A decoded message received from one of the algorithm servers.
///
/// Every stream is modelled as a closed tagged union with an explicit
/// catch-all variant for discriminators this client does not know yet.
pub trait ObserverMessage: Send + Sync {
    /// Wire discriminator (or a stable name for untagged streams).
    fn message_type(&self) -> &'static str;

    /// The agent alias the message is about, if it concerns a single one.
    fn subject(&self) -> Option<&str> {
        None
    }

    /// False for the catch-all variant.
    fn is_recognized(&self) -> bool {
        true
    }
}

/// Parse one JSON text frame into a stream message.
///
/// Parse failures, missing fields and type mismatches all map to
/// `DomainError::MalformedMessage`.
pub fn decode_frame<M: DeserializeOwned>(frame: &str) -> DomainResult<M> {
    serde_json::from_str(frame).map_err(|e| DomainError::malformed(e.to_string()))
}
