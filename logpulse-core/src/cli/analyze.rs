use crate::conf::LogpulseConfig;
use crate::pipeline::{CancelSignal, Pipeline, RunReport};
use crate::report::print_report;
use std::path::Path;

/// Run the pipeline over `input` and print the report.
///
/// Nothing is printed when the run fails or is cancelled.
pub fn run_analyze(
    input: &Path,
    config: &LogpulseConfig,
    cancel: CancelSignal,
) -> anyhow::Result<RunReport> {
    let pipeline = Pipeline::new(input, &config.pipeline);
    let report = pipeline.run_with_cancel(cancel)?;

    print_report(&report, config.report.format)?;

    Ok(report)
}
