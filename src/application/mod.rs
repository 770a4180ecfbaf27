pub mod fleet_service;
pub mod location_cloaking_service;
pub mod path_confusion_service;
pub mod supervisor;

pub use fleet_service::*;
pub use location_cloaking_service::*;
pub use path_confusion_service::*;
pub use supervisor::*;
