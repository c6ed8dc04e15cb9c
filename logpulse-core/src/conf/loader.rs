use crate::conf::error::ConfigError;
use crate::conf::types::{LogFormat, LogpulseConfig, ReportFormat};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub const MAX_WORKERS: usize = 256;
pub const MAX_FAILURE_CAPACITY: usize = 1024;

/// Command-line values that win over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub workers: Option<usize>,
    pub report_format: Option<ReportFormat>,
    pub log_format: Option<LogFormat>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut LogpulseConfig) {
        if let Some(workers) = self.workers {
            config.pipeline.workers = workers;
        }
        if let Some(format) = self.report_format {
            config.report.format = format;
        }
        if let Some(format) = self.log_format {
            config.logging.format = Some(format);
        }
    }
}

/// Load the effective configuration: defaults, then the optional HCL file,
/// then command-line overrides. The result is validated.
pub fn load_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<LogpulseConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_config(path)?,
        None => LogpulseConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config)?;

    Ok(config)
}

pub fn parse_config(path: &Path) -> Result<LogpulseConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    hcl::from_str(&s).map_err(|e| ConfigError::parse(path, e))
}

pub fn validate_config(config: &LogpulseConfig) -> Result<(), ConfigError> {
    let workers = config.pipeline.workers;
    if !(1..=MAX_WORKERS).contains(&workers) {
        return Err(ConfigError::InvalidWorkers {
            workers,
            max: MAX_WORKERS,
        });
    }

    let capacity = config.pipeline.failure_capacity;
    if capacity > MAX_FAILURE_CAPACITY {
        return Err(ConfigError::InvalidFailureCapacity {
            capacity,
            max: MAX_FAILURE_CAPACITY,
        });
    }

    let level = config.logging.level.trim();
    if level.is_empty() {
        return Err(ConfigError::InvalidLogLevel {
            level: config.logging.level.clone(),
            reason: "level must not be empty".to_string(),
        });
    }
    if let Err(e) = EnvFilter::try_new(level) {
        return Err(ConfigError::InvalidLogLevel {
            level: config.logging.level.clone(),
            reason: e.to_string(),
        });
    }

    Ok(())
}
