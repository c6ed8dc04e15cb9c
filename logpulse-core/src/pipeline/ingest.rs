use crate::pipeline::failure::{FailureCause, FailureSink, Severity, Stage};
use crate::pipeline::shutdown::{CancelSignal, Handoff, send_or_cancel};
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::types::RawLine;
use crossbeam_channel::Sender;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

/// Reads the input file and feeds the parser pool.
#[derive(Debug, Clone)]
pub struct Ingestor {
    path: PathBuf,
}

impl Ingestor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the source. The handle lives inside the returned [`RawLines`] and is
    /// closed when it is dropped.
    pub fn open(&self) -> Result<RawLines<BufReader<File>>, FailureCause> {
        let file = File::open(&self.path).map_err(|source| FailureCause::Open {
            path: self.path.clone(),
            source,
        })?;

        Ok(RawLines::new(BufReader::new(file), self.path.clone()))
    }

    pub(crate) fn run(
        self,
        out: Sender<RawLine>,
        failures: FailureSink,
        cancel: CancelSignal,
        stats: &PipelineStats,
    ) {
        let lines = match self.open() {
            Ok(lines) => lines,
            Err(cause) => {
                failures.report(Stage::Ingest, cause);
                return;
            }
        };

        tracing::debug!(path = %self.path.display(), "ingesting");

        for item in lines {
            if cancel.is_cancelled() {
                tracing::debug!("ingest cancelled");
                return;
            }

            match item {
                Ok(line) => {
                    stats.line_read();
                    match send_or_cancel(&out, line, &cancel) {
                        Handoff::Delivered => {}
                        Handoff::Closed | Handoff::Cancelled => {
                            tracing::debug!("ingest stopped before end of input");
                            return;
                        }
                    }
                }
                Err(cause) => {
                    let fatal = cause.severity() == Severity::Fatal;
                    failures.report(Stage::Ingest, cause);
                    if fatal {
                        return;
                    }
                }
            }
        }

        tracing::debug!(path = %self.path.display(), "input exhausted");
    }
}

/// Lazy, non-restartable sequence of lines from a buffered reader.
///
/// Blank lines are skipped. A line that is not UTF-8 yields a recoverable error and
/// iteration continues; a read fault yields one fatal error and ends the sequence.
pub struct RawLines<R> {
    reader: R,
    path: PathBuf,
    line_no: u64,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> RawLines<R> {
    pub fn new(reader: R, path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            path: path.into(),
            line_no: 0,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RawLines<R> {
    type Item = Result<RawLine, FailureCause>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(_) => {}
                Err(source) => {
                    self.done = true;
                    return Some(Err(FailureCause::Read {
                        path: self.path.clone(),
                        line_no: self.line_no,
                        source,
                    }));
                }
            }

            self.line_no += 1;
            while matches!(self.buf.last(), Some(b'\n' | b'\r')) {
                self.buf.pop();
            }

            let text = match std::str::from_utf8(&self.buf) {
                Ok(text) => text,
                Err(_) => {
                    return Some(Err(FailureCause::InvalidUtf8 {
                        line_no: self.line_no,
                    }));
                }
            };

            if text.trim().is_empty() {
                continue;
            }

            return Some(Ok(RawLine {
                line_no: self.line_no,
                text: text.to_string(),
            }));
        }

        None
    }
}
