use crate::conf::PipelineConfig;
use crate::pipeline::aggregate::run_aggregator;
use crate::pipeline::failure::{Failure, FailureSink, FailureWatcher, failure_channel};
use crate::pipeline::filter::run_filter;
use crate::pipeline::ingest::Ingestor;
use crate::pipeline::merge::merge;
use crate::pipeline::parse::run_parser;
use crate::pipeline::shutdown::{CancelSignal, CompletionTracker};
use crate::pipeline::stats::{PipelineCounts, PipelineStats};
use crate::pipeline::types::{HealthSummary, LogRecord, RawLine};
use crossbeam_channel::bounded;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thiserror::Error;

/// Stage-to-stage handoff is a rendezvous: no item waits in a queue.
const HANDOFF_CAPACITY: usize = 0;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("pipeline aborted: {0}")]
    Fatal(Failure),

    #[error("pipeline cancelled before completion")]
    Cancelled,

    #[error("failed to spawn {worker} worker: {source}")]
    Spawn {
        worker: String,
        #[source]
        source: io::Error,
    },

    #[error("{worker} worker panicked")]
    WorkerPanicked { worker: String },
}

/// Everything a successful run produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunReport {
    pub summary: HealthSummary,
    pub counts: PipelineCounts,
    pub recoverable_failures: u64,
}

/// A configured pipeline over one input file.
#[derive(Debug, Clone)]
pub struct Pipeline {
    source: PathBuf,
    workers: usize,
    failure_capacity: usize,
}

struct Workers {
    stages: Vec<(String, JoinHandle<()>)>,
    aggregator: JoinHandle<Option<HealthSummary>>,
}

impl Pipeline {
    pub fn new(source: impl Into<PathBuf>, config: &PipelineConfig) -> Self {
        Self {
            source: source.into(),
            workers: config.workers.max(1),
            failure_capacity: config.failure_capacity,
        }
    }

    pub fn run(&self) -> Result<RunReport, PipelineError> {
        self.run_with_cancel(CancelSignal::new())
    }

    /// Run to completion, or until `cancel` fires or a fatal failure is observed.
    pub fn run_with_cancel(&self, cancel: CancelSignal) -> Result<RunReport, PipelineError> {
        tracing::info!(
            source = %self.source.display(),
            workers = self.workers,
            "pipeline starting"
        );

        let stats = Arc::new(PipelineStats::default());
        let (failures, failure_rx) = failure_channel(self.failure_capacity);

        let watcher = FailureWatcher::new(failure_rx, cancel.clone());
        let watcher = thread::Builder::new()
            .name("logpulse-failure-watcher".into())
            .spawn(move || watcher.watch())
            .map_err(|source| PipelineError::Spawn {
                worker: "failure watcher".into(),
                source,
            })?;

        let mut tracker = CompletionTracker::new();
        let spawned = self.spawn_workers(&mut tracker, &failures, &cancel, &stats);
        if spawned.is_err() {
            cancel.cancel();
        }

        // Shutdown coordination: the sink closes only once no worker can send.
        tracker.wait();
        drop(failures);

        let outcome = watcher.join().map_err(|_| PipelineError::WorkerPanicked {
            worker: "failure watcher".into(),
        })?;

        let workers = spawned?;
        for (worker, handle) in workers.stages {
            handle
                .join()
                .map_err(|_| PipelineError::WorkerPanicked { worker })?;
        }
        let summary = workers
            .aggregator
            .join()
            .map_err(|_| PipelineError::WorkerPanicked {
                worker: "aggregator".into(),
            })?;

        if let Some(fatal) = outcome.fatal {
            return Err(PipelineError::Fatal(fatal));
        }

        let summary = summary.ok_or(PipelineError::Cancelled)?;
        let counts = stats.snapshot();

        tracing::info!(
            lines_read = counts.lines_read,
            records_decoded = counts.records_decoded,
            records_kept = counts.records_kept,
            recoverable_failures = outcome.recoverable,
            "pipeline finished"
        );

        Ok(RunReport {
            summary,
            counts,
            recoverable_failures: outcome.recoverable,
        })
    }

    fn spawn_workers(
        &self,
        tracker: &mut CompletionTracker,
        failures: &FailureSink,
        cancel: &CancelSignal,
        stats: &Arc<PipelineStats>,
    ) -> Result<Workers, PipelineError> {
        let mut stages = Vec::with_capacity(2 * self.workers + 2);

        //---------------------------------------------------------------------
        // Ingest
        //---------------------------------------------------------------------
        let (raw_tx, raw_rx) = bounded::<RawLine>(HANDOFF_CAPACITY);
        let handle = {
            let ingestor = Ingestor::new(self.source.clone());
            let failures = failures.clone();
            let cancel = cancel.clone();
            let stats = stats.clone();
            spawn_stage(tracker, "ingest", move || {
                ingestor.run(raw_tx, failures, cancel, &stats)
            })?
        };
        stages.push(handle);

        //---------------------------------------------------------------------
        // Parse + filter lanes
        //---------------------------------------------------------------------
        let mut filtered = Vec::with_capacity(self.workers);
        for lane in 0..self.workers {
            let (parsed_tx, parsed_rx) = bounded::<LogRecord>(HANDOFF_CAPACITY);
            let (kept_tx, kept_rx) = bounded::<LogRecord>(HANDOFF_CAPACITY);

            let handle = {
                let input = raw_rx.clone();
                let failures = failures.clone();
                let cancel = cancel.clone();
                let stats = stats.clone();
                spawn_stage(tracker, format!("parse-{lane}"), move || {
                    run_parser(lane, input, parsed_tx, failures, cancel, &stats)
                })?
            };
            stages.push(handle);

            let handle = {
                let cancel = cancel.clone();
                let stats = stats.clone();
                spawn_stage(tracker, format!("filter-{lane}"), move || {
                    run_filter(lane, parsed_rx, kept_tx, cancel, &stats)
                })?
            };
            stages.push(handle);

            filtered.push(kept_rx);
        }
        drop(raw_rx);

        //---------------------------------------------------------------------
        // Merge
        //---------------------------------------------------------------------
        let (merged_tx, merged_rx) = bounded::<LogRecord>(HANDOFF_CAPACITY);
        let handle = {
            let cancel = cancel.clone();
            spawn_stage(tracker, "merge", move || merge(filtered, merged_tx, &cancel))?
        };
        stages.push(handle);

        //---------------------------------------------------------------------
        // Aggregate
        //---------------------------------------------------------------------
        let aggregator = {
            let failures = failures.clone();
            let cancel = cancel.clone();
            tracker
                .spawn("logpulse-aggregate", move || {
                    run_aggregator(merged_rx, failures, cancel)
                })
                .map_err(|source| PipelineError::Spawn {
                    worker: "aggregate".into(),
                    source,
                })?
        };

        tracing::debug!(workers = tracker.registered(), "pipeline workers spawned");

        Ok(Workers { stages, aggregator })
    }
}

fn spawn_stage<F>(
    tracker: &mut CompletionTracker,
    worker: impl Into<String>,
    f: F,
) -> Result<(String, JoinHandle<()>), PipelineError>
where
    F: FnOnce() + Send + 'static,
{
    let worker = worker.into();
    match tracker.spawn(format!("logpulse-{worker}"), f) {
        Ok(handle) => Ok((worker, handle)),
        Err(source) => Err(PipelineError::Spawn { worker, source }),
    }
}
