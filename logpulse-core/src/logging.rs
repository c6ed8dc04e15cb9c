use crate::conf::{LogFormat, LoggingConfig};
use anyhow::{Context, anyhow};
use std::io::{self, IsTerminal};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the logging system.
///
/// - `RUST_LOG` wins over the configured level
/// - Diagnostics go to stderr (stdout carries the report) or to the configured file
/// - JSON output flattens event fields for cleaner log lines
///
/// When logging to a file, the returned guard must be kept alive until exit so
/// buffered lines get flushed.
pub fn init_logging(cfg: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cfg.level)
            .with_context(|| format!("invalid log level '{}'", cfg.level))?,
    };

    let (writer, guard) = match &cfg.file {
        Some(path) => {
            let (writer, guard) = file_writer(path)?;
            (writer, Some(guard))
        }
        None => (BoxMakeWriter::new(io::stderr), None),
    };

    let builder = fmt().with_env_filter(filter).with_writer(writer);

    let installed = match resolve_log_format(cfg) {
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
        LogFormat::Pretty => builder
            .with_ansi(cfg.file.is_none() && io::stderr().is_terminal())
            .compact()
            .try_init(),
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))?;

    Ok(guard)
}

fn file_writer(path: &Path) -> anyhow::Result<(BoxMakeWriter, WorkerGuard)> {
    let file_name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    Ok((BoxMakeWriter::new(non_blocking), guard))
}

/// The configured format, or the terminal-based default when none is set.
pub fn resolve_log_format(cfg: &LoggingConfig) -> LogFormat {
    cfg.format.unwrap_or_else(default_log_format)
}

/// Pretty logs for interactive sessions, JSON everywhere else.
pub fn default_log_format() -> LogFormat {
    if io::stderr().is_terminal() {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn explicit_format_wins() {
        let cfg = LoggingConfig {
            format: Some(LogFormat::Pretty),
            ..Default::default()
        };

        assert_eq!(resolve_log_format(&cfg), LogFormat::Pretty);
    }

    #[test]
    fn unset_format_follows_the_terminal() {
        let cfg = LoggingConfig::default();

        assert_eq!(resolve_log_format(&cfg), default_log_format());
    }
}
