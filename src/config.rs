use crate::application::SupervisorSettings;
use crate::domains::location_cloaking::{PositionVicinityColors, TileColors};
use crate::domains::temporal_cloaking::TemporalCloakingSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub location_server: ServerConfig,
    pub fleet: ServerConfig,
    pub path_confusion: PathConfusionConfig,
    pub supervisor: SupervisorConfig,
    pub tile_colors: TileColors,
    pub temporal_cloaking: TemporalCloakingSettings,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ServerConfig {
    pub fn new(host: &str, port: u16, path: &str) -> Self {
        Self {
            host: host.to_string(),
            port,
            path: path.to_string(),
            enabled: true,
        }
    }

    pub fn endpoint(&self) -> String {
        endpoint(&self.host, self.port, &self.path)
    }
}

fn endpoint(host: &str, port: u16, path: &str) -> String {
    if path.starts_with('/') {
        format!("ws://{}:{}{}", host, port, path)
    } else {
        format!("ws://{}:{}/{}", host, port, path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfusionConfig {
    #[serde(flatten)]
    pub server: ServerConfig,
    pub command_path: String,
}

impl PathConfusionConfig {
    pub fn command_endpoint(&self) -> String {
        endpoint(&self.server.host, self.server.port, &self.command_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisorConfig {
    pub reconnect_delay_ms: u64,
}

impl SupervisorConfig {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn settings_for(&self, server: &ServerConfig) -> SupervisorSettings {
        SupervisorSettings::new(server.endpoint()).with_reconnect_delay(self.reconnect_delay())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// fast_log output file; console only when unset.
    pub file: Option<String>,
}

impl Config {
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Defaults, then the optional file, then `CLOAKSCOPE__SECTION__KEY`
    /// environment variables.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        let mut builder = ::config::Config::builder()
            .add_source(::config::Config::try_from(&Config::default()).context("serializing defaults")?);
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path.as_ref()).required(false));
        }
        builder
            .add_source(
                ::config::Environment::with_prefix("CLOAKSCOPE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .context("loading configuration")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location_server: ServerConfig::new("127.0.0.1", 8000, "/observe"),
            fleet: ServerConfig::new("127.0.0.1", 8080, "/carla/agents-stream"),
            path_confusion: PathConfusionConfig {
                server: ServerConfig::new("127.0.0.1", 8765, "/observe"),
                command_path: "/command".to_string(),
            },
            supervisor: SupervisorConfig {
                reconnect_delay_ms: 4000,
            },
            tile_colors: TileColors {
                default: PositionVicinityColors {
                    position: Some("#4c6ef5".to_string()),
                    vicinity: Some("#fab005".to_string()),
                },
                per_agent: Default::default(),
            },
            temporal_cloaking: TemporalCloakingSettings::default(),
            logging: LoggingConfig { file: None },
        }
    }
}
