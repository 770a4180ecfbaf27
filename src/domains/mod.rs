pub mod dummy_locations;
pub mod fleet;
pub mod location_cloaking;
pub mod logger;
pub mod path_confusion;
pub mod temporal_cloaking;

pub use dummy_locations::*;
pub use fleet::*;
pub use location_cloaking::*;
pub use logger::*;
pub use path_confusion::*;
pub use temporal_cloaking::*;
