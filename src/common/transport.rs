use crate::common::TransportError;
use async_trait::async_trait;

/// An established, receive-only stream of JSON text frames.
#[async_trait]
pub trait FrameStream: Send {
    /// Next text frame. `None` once the remote end closed the stream.
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>>;

    /// Release the stream. Called exactly once per established stream.
    async fn close(&mut self);
}

/// Opens frame streams; one call per connection attempt.
#[async_trait]
pub trait StreamConnector: Send + Sync {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, TransportError>;
}
