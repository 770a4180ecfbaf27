pub mod aggregate;
pub mod events;
pub mod granule;
pub mod projections;

pub use aggregate::*;
pub use events::*;
pub use granule::*;
pub use projections::*;
pub mod ports;

pub use ports::*;
