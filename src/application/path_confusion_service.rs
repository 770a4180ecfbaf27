use crate::common::ApplicationResult;
use crate::domains::path_confusion::ObserverCommand;
use async_trait::async_trait;
use std::sync::Arc;

/// Port for delivering observer commands to the path confusion server.
#[async_trait]
pub trait CommandSender: Send + Sync {
    async fn send(&self, command: &ObserverCommand) -> ApplicationResult<()>;
}

/// Controls recordings and live mode of the path confusion server.
pub struct PathConfusionService {
    sender: Arc<dyn CommandSender>,
}

impl PathConfusionService {
    pub fn new(sender: Arc<dyn CommandSender>) -> Self {
        Self { sender }
    }

    pub async fn add_recording(&self, name: impl Into<String>) -> ApplicationResult<()> {
        self.sender
            .send(&ObserverCommand::AddRecording { name: name.into() })
            .await
    }

    pub async fn load_recording(&self, file_name: impl Into<String>) -> ApplicationResult<()> {
        self.sender
            .send(&ObserverCommand::LoadRecording {
                recording_file_name: file_name.into(),
            })
            .await
    }

    pub async fn delete_recording(&self, file_name: impl Into<String>) -> ApplicationResult<()> {
        self.sender
            .send(&ObserverCommand::DeleteRecording {
                recording_file_name: file_name.into(),
            })
            .await
    }

    pub async fn go_live(&self) -> ApplicationResult<()> {
        self.sender.send(&ObserverCommand::GoLive).await
    }

    /// Restart the algorithm with the current settings.
    pub async fn reset(&self) -> ApplicationResult<()> {
        self.sender.send(&ObserverCommand::Reset).await
    }
}
