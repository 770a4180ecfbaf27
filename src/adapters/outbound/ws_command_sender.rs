use crate::application::CommandSender;
use crate::common::{ApplicationResult, TransportError};
use crate::domains::path_confusion::ObserverCommand;
use async_trait::async_trait;
use futures_util::SinkExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Sends each command over its own short-lived websocket connection.
pub struct WsCommandSender {
    endpoint: String,
}

impl WsCommandSender {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CommandSender for WsCommandSender {
    async fn send(&self, command: &ObserverCommand) -> ApplicationResult<()> {
        let frame = command.to_frame()?;
        let (mut ws_stream, _) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        ws_stream
            .send(Message::Text(frame))
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        if let Err(e) = ws_stream.close(None).await {
            tracing::debug!("command socket close: {}", e);
        }
        tracing::info!("sent {:?} to {}", command, self.endpoint);
        Ok(())
    }
}
