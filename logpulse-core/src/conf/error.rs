use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    //-------------------------------------------------------------------------
    // IO / Parsing
    //-------------------------------------------------------------------------
    #[error("failed to read config file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration file: {}\n\n{source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: hcl::Error,
    },

    //-------------------------------------------------------------------------
    // Pipeline
    //-------------------------------------------------------------------------
    #[error("invalid worker count {workers}: must be between 1 and {max}")]
    InvalidWorkers { workers: usize, max: usize },

    #[error("invalid failure capacity {capacity}: must be at most {max}")]
    InvalidFailureCapacity { capacity: usize, max: usize },

    //-------------------------------------------------------------------------
    // Logging
    //-------------------------------------------------------------------------
    #[error("invalid log level '{level}': {reason}")]
    InvalidLogLevel { level: String, reason: String },
}

impl ConfigError {
    pub(crate) fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, source: hcl::Error) -> Self {
        Self::Parse {
            path: path.into(),
            source,
        }
    }
}
