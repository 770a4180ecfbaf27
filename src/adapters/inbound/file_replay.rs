use crate::common::{FrameStream, StreamConnector, TransportError};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Replays recorded frames from JSON Lines files (one frame per line).
///
/// The endpoint names the recording relative to `base_path`, so the same
/// supervisor configuration can point at either a live server or a recording.
///
/// The end of a recording reads like the server closing the stream. Under a
/// `ConnectionSupervisor` the recording is therefore replayed from the start
/// after every reconnect delay until the supervisor is shut down. Lines that
/// are not valid UTF-8 are skipped with a warning.
pub struct FileReplayConnector {
    base_path: PathBuf,
}

impl FileReplayConnector {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn get_file_path(&self, endpoint: &str) -> PathBuf {
        let name = endpoint.rsplit('/').next().unwrap_or(endpoint);
        self.base_path.join(format!("{}.jsonl", name))
    }
}

pub struct FileReplayStream {
    reader: BufReader<File>,
    line_no: usize,
}

#[async_trait]
impl StreamConnector for FileReplayConnector {
    async fn connect(&self, endpoint: &str) -> Result<Box<dyn FrameStream>, TransportError> {
        let path = self.get_file_path(endpoint);
        let file = File::open(&path)
            .await
            .map_err(|e| TransportError::Connect(format!("{}: {}", path.display(), e)))?;
        Ok(Box::new(FileReplayStream {
            reader: BufReader::new(file),
            line_no: 0,
        }))
    }
}

#[async_trait]
impl FrameStream for FileReplayStream {
    async fn next_frame(&mut self) -> Option<Result<String, TransportError>> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf).await {
                // End of recording behaves like the server closing the stream.
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(e) => return Some(Err(TransportError::Stream(e.to_string()))),
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(_) => {
                    tracing::warn!("ignoring non-utf8 line {} of recording", self.line_no);
                    continue;
                }
            };
            if !line.is_empty() {
                return Some(Ok(line.to_string()));
            }
        }
    }

    async fn close(&mut self) {}
}
