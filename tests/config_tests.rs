use cloakscope::Config;
use std::io::Write;
use tokio::time::Duration;

const SAMPLE: &str = r##"
[location_server]
host = "10.0.0.5"
port = 9000
path = "observe"

[supervisor]
reconnect_delay_ms = 250

[tile_colors.default]
position = "#ff0000"

[tile_colors.per_agent.alice]
vicinity = "#00ff00"

[temporal_cloaking]
constraint_k = 4
"##;

#[test]
fn test_defaults_match_observer_constants() {
    let config = Config::default();
    assert_eq!(config.supervisor.reconnect_delay(), Duration::from_millis(4000));
    assert_eq!(config.location_server.endpoint(), "ws://127.0.0.1:8000/observe");
    assert_eq!(config.fleet.endpoint(), "ws://127.0.0.1:8080/carla/agents-stream");
    assert_eq!(config.path_confusion.command_endpoint(), "ws://127.0.0.1:8765/command");
    assert_eq!(config.temporal_cloaking.max_steps, 7);
}

#[tokio::test]
async fn test_from_file_reads_partial_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let config = Config::from_file(file.path()).await.unwrap();

    assert_eq!(config.location_server.endpoint(), "ws://10.0.0.5:9000/observe");
    assert!(config.location_server.enabled);
    assert_eq!(config.supervisor.reconnect_delay_ms, 250);
    assert_eq!(config.tile_colors.default.position.as_deref(), Some("#ff0000"));
    assert_eq!(config.tile_colors.default.vicinity, None);
    let alice = config.tile_colors.for_agent("alice");
    assert_eq!(alice.position, None);
    assert_eq!(alice.vicinity.as_deref(), Some("#00ff00"));
    assert_eq!(config.temporal_cloaking.constraint_k, 4);
    assert_eq!(config.temporal_cloaking.max_steps, 7);
    // untouched sections keep their defaults
    assert_eq!(config.fleet.port, 8080);
}

#[tokio::test]
async fn test_from_file_rejects_invalid_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"[supervisor\nreconnect_delay_ms = ").unwrap();
    assert!(Config::from_file(file.path()).await.is_err());
}

#[test]
fn test_load_layers_file_and_environment() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();

    let from_file = Config::load(Some(file.path())).unwrap();
    assert_eq!(from_file.location_server.port, 9000);
    assert_eq!(from_file.supervisor.reconnect_delay_ms, 250);
    assert_eq!(from_file.fleet.path, "/carla/agents-stream");

    std::env::set_var("CLOAKSCOPE__SUPERVISOR__RECONNECT_DELAY_MS", "1500");
    let layered = Config::load(Some(file.path()));
    std::env::remove_var("CLOAKSCOPE__SUPERVISOR__RECONNECT_DELAY_MS");
    assert_eq!(layered.unwrap().supervisor.reconnect_delay_ms, 1500);

    let missing = Config::load(Some("does-not-exist.toml")).unwrap();
    assert_eq!(missing.supervisor.reconnect_delay_ms, 4000);
}
