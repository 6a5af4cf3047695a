pub mod config;
pub mod logging;

pub use config::{CatalogConfig, DialectSetting, LoggingConfig, ModelGenConfig};
pub use logging::init_logging;
