use crate::pipeline::failure::{FailureCause, FailureSink, Stage};
use crate::pipeline::shutdown::{CancelSignal, recv_or_cancel};
use crate::pipeline::types::{HealthSummary, Level, LogRecord};
use crossbeam_channel::Receiver;

pub const STATUS_ATTR: &str = "status";

const FAILED_STATUS_THRESHOLD: f64 = 400.0;

/// Folds records into a [`HealthSummary`].
///
/// Every update is a counter increment, so the final summary does not depend on
/// the order records arrive in.
#[derive(Debug, Default)]
pub struct HealthAggregator {
    summary: HealthSummary,
}

impl HealthAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one record.
    ///
    /// An INFO record is always counted as a request. A missing or non-numeric
    /// `status` is returned as an error after counting, and only skips the
    /// failed-request check.
    pub fn observe(&mut self, record: &LogRecord) -> Result<(), FailureCause> {
        match record.level {
            Level::Warn => self.summary.warnings += 1,
            Level::Error => self.summary.errors += 1,
            Level::Info => {
                self.summary.total_requests += 1;

                let status = record
                    .attr(STATUS_ATTR)
                    .ok_or(FailureCause::MissingStatus)?
                    .as_f64()?;

                if status >= FAILED_STATUS_THRESHOLD {
                    self.summary.failed_requests += 1;
                }
            }
            Level::Debug | Level::Other(_) => {}
        }

        Ok(())
    }

    pub fn finish(self) -> HealthSummary {
        self.summary
    }
}

/// Drain the merged stream. Returns the summary only if the stream ended
/// naturally; a cancelled run produces none.
pub(crate) fn run_aggregator(
    input: Receiver<LogRecord>,
    failures: FailureSink,
    cancel: CancelSignal,
) -> Option<HealthSummary> {
    let mut aggregator = HealthAggregator::new();

    while let Some(record) = recv_or_cancel(&input, &cancel) {
        if let Err(cause) = aggregator.observe(&record) {
            failures.report(Stage::Aggregate, cause);
        }
    }

    if cancel.is_cancelled() {
        tracing::debug!("aggregation cancelled; no summary emitted");
        return None;
    }

    let summary = aggregator.finish();
    tracing::debug!(
        total_requests = summary.total_requests,
        failed_requests = summary.failed_requests,
        warnings = summary.warnings,
        errors = summary.errors,
        "aggregation complete"
    );

    Some(summary)
}
