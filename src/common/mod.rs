pub mod error;
pub mod message;
pub mod aggregate;
pub mod transport;

pub use error::*;
pub use message::*;
pub use aggregate::*;
pub use transport::*;
