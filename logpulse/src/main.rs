use clap::{Parser, Subcommand};
use logpulse_core::cli::analyze::run_analyze;
use logpulse_core::cli::generate::run_generate;
use logpulse_core::conf::{ConfigOverrides, LogFormat, LoggingConfig, ReportFormat, load_config};
use logpulse_core::logging::init_logging;
use logpulse_core::pipeline::CancelSignal;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "logpulse",
    version,
    about = "Logpulse: concurrent log health summaries"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize request failures, warnings, and errors in a JSON-lines log
    Analyze {
        /// Log file to read
        input: PathBuf,

        /// Path to an HCL config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Parser/filter lanes
        #[arg(long)]
        workers: Option<usize>,

        /// Report format written to stdout
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,

        /// Diagnostic log format written to stderr
        #[arg(long, value_enum)]
        log_format: Option<LogFormat>,
    },

    /// Write synthetic log lines for trying out `analyze`
    Generate {
        /// Destination file
        output: PathBuf,

        #[arg(long, default_value_t = 1000)]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();

    // `run` owns the log guard, so buffered lines are flushed before exiting.
    if let Err(e) = run(cli) {
        eprintln!("logpulse: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Analyze {
            input,
            config,
            workers,
            format,
            log_format,
        } => {
            let overrides = ConfigOverrides {
                workers,
                report_format: format,
                log_format,
            };
            let cfg = load_config(config.as_deref(), &overrides)?;
            let _guard = init_logging(&cfg.logging)?;

            let cancel = CancelSignal::new();
            {
                let cancel = cancel.clone();
                ctrlc::set_handler(move || {
                    tracing::warn!("interrupt received; cancelling pipeline");
                    cancel.cancel();
                })?;
            }

            run_analyze(&input, &cfg, cancel)?;
        }

        Command::Generate {
            output,
            count,
            seed,
        } => {
            let _guard = init_logging(&LoggingConfig::default())?;

            run_generate(&output, count, seed)?;
        }
    }

    Ok(())
}
