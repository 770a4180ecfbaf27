pub mod channel_transport;
pub mod file_replay;
pub mod websocket;

pub use channel_transport::*;
pub use file_replay::*;
pub use websocket::*;
