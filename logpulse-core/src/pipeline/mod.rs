//! Log Health Pipeline
//!
//! This module turns a newline-delimited JSON log file into a single health summary.
//!
//! Every stage runs on its own threads and hands records to the next stage through
//! rendezvous channels, so a fast stage simply waits for a slow one instead of
//! buffering. The stages are:
//!
//! - **Ingest**: one thread reads the file line by line
//! - **Parse**: N threads compete for raw lines and decode them into [`LogRecord`]s
//! - **Filter**: one thread per parser lane keeps warnings, errors and HTTP requests
//! - **Merge**: fans every filter lane back into one stream
//! - **Aggregate**: folds the merged stream into one [`HealthSummary`]
//!
//! Problems travel on a separate failure channel. Bad lines are logged and dropped;
//! an unreadable source cancels every worker and the run ends without a summary.
//!
//! The overall data processing architecture is:
//!
//! file
//! Ingestor
//! RawLine ──► parser lane 0..N
//! LogRecord ──► filter lane 0..N
//! merge
//! HealthAggregator
//! HealthSummary
//!

mod aggregate;
mod failure;
mod filter;
mod ingest;
mod merge;
mod parse;
mod run;
mod shutdown;
mod stats;
mod types;

#[cfg(test)]
mod tests;

pub use aggregate::{HealthAggregator, STATUS_ATTR};
pub use failure::{
    Failure, FailureCause, FailureSink, FailureWatcher, Severity, Stage, WatchOutcome,
    failure_channel,
};
pub use filter::{HTTP_REQUEST_MESSAGE, keep};
pub use ingest::{Ingestor, RawLines};
pub use merge::merge;
pub use parse::decode_line;
pub use run::{Pipeline, PipelineError, RunReport};
pub use shutdown::{CancelSignal, CompletionTracker};
pub use stats::{PipelineCounts, PipelineStats};
pub use types::{AttrError, AttrValue, Attributes, HealthSummary, Level, LogRecord, RawLine};
