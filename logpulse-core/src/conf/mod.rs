mod error;
mod loader;
pub mod types;


pub use error::ConfigError;
pub use loader::{ConfigOverrides, load_config, parse_config, validate_config};
pub use types::{
    LogFormat, LoggingConfig, LogpulseConfig, PipelineConfig, ReportConfig, ReportFormat,
};
