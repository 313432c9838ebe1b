pub mod app_config;
pub mod logging;
pub mod processor;
pub mod store_observability;

pub use app_config::*;
pub use logging::*;
pub use processor::*;
pub use store_observability::*;
