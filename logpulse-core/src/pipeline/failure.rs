use crate::pipeline::shutdown::CancelSignal;
use crate::pipeline::types::AttrError;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Scoped to one line or record; the run continues.
    Recoverable,
    /// The run cannot make further progress.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingest,
    Parse { lane: usize },
    Aggregate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Ingest => f.write_str("ingest"),
            Stage::Parse { lane } => write!(f, "parse[{lane}]"),
            Stage::Aggregate => f.write_str("aggregate"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FailureCause {
    //-------------------------------------------------------------------------
    // Source (fatal)
    //-------------------------------------------------------------------------
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {} after line {line_no}: {source}", path.display())]
    Read {
        path: PathBuf,
        line_no: u64,
        #[source]
        source: io::Error,
    },

    //-------------------------------------------------------------------------
    // Record (recoverable)
    //-------------------------------------------------------------------------
    #[error("line {line_no} is not valid UTF-8")]
    InvalidUtf8 { line_no: u64 },

    #[error("failed to decode line {line_no} `{line}`: {source}")]
    Decode {
        line_no: u64,
        line: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing required status")]
    MissingStatus,

    #[error("failed to interpret status: {0}")]
    InvalidStatus(#[from] AttrError),
}

impl FailureCause {
    pub fn severity(&self) -> Severity {
        match self {
            FailureCause::Open { .. } | FailureCause::Read { .. } => Severity::Fatal,
            FailureCause::InvalidUtf8 { .. }
            | FailureCause::Decode { .. }
            | FailureCause::MissingStatus
            | FailureCause::InvalidStatus(_) => Severity::Recoverable,
        }
    }
}

#[derive(Debug, Error)]
#[error("{stage} stage: {cause}")]
pub struct Failure {
    pub stage: Stage,
    pub cause: FailureCause,
}

impl Failure {
    pub fn severity(&self) -> Severity {
        self.cause.severity()
    }
}

/// Producer side of the shared failure channel. Cloned into every stage.
#[derive(Debug, Clone)]
pub struct FailureSink {
    tx: Sender<Failure>,
}

impl FailureSink {
    pub fn report(&self, stage: Stage, cause: FailureCause) {
        if self.tx.send(Failure { stage, cause }).is_err() {
            tracing::debug!(%stage, "failure watcher gone; dropping failure");
        }
    }
}

/// Bounded channel carrying failures from every stage to a single watcher.
///
/// The channel closes once the last [`FailureSink`] clone is dropped.
pub fn failure_channel(capacity: usize) -> (FailureSink, Receiver<Failure>) {
    let (tx, rx) = bounded(capacity);
    (FailureSink { tx }, rx)
}

#[derive(Debug, Default)]
pub struct WatchOutcome {
    pub recoverable: u64,
    /// First fatal failure observed, if any.
    pub fatal: Option<Failure>,
}

pub struct FailureWatcher {
    rx: Receiver<Failure>,
    cancel: CancelSignal,
}

impl FailureWatcher {
    pub fn new(rx: Receiver<Failure>, cancel: CancelSignal) -> Self {
        Self { rx, cancel }
    }

    /// Drain the failure channel until every sink is dropped.
    ///
    /// The first fatal failure cancels the pipeline. Draining continues after that
    /// so producers never block on a full channel while winding down.
    pub fn watch(self) -> WatchOutcome {
        let mut outcome = WatchOutcome::default();

        for failure in self.rx.iter() {
            match failure.severity() {
                Severity::Recoverable => {
                    outcome.recoverable += 1;
                    tracing::warn!(
                        stage = %failure.stage,
                        error = %failure.cause,
                        "dropping record"
                    );
                }
                Severity::Fatal if outcome.fatal.is_none() => {
                    tracing::error!(
                        stage = %failure.stage,
                        error = %failure.cause,
                        "fatal failure; cancelling pipeline"
                    );
                    self.cancel.cancel();
                    outcome.fatal = Some(failure);
                }
                Severity::Fatal => {
                    tracing::debug!(
                        stage = %failure.stage,
                        error = %failure.cause,
                        "additional fatal failure after cancellation"
                    );
                }
            }
        }

        outcome
    }
}
