pub mod aggregate;
pub mod projections;

pub use aggregate::*;
pub use projections::*;
