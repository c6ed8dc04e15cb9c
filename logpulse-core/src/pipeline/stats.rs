use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Throughput counters shared by the pipeline stages.
#[derive(Debug, Default)]
pub struct PipelineStats {
    lines_read: AtomicU64,
    records_decoded: AtomicU64,
    records_kept: AtomicU64,
}

impl PipelineStats {
    pub(crate) fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decoded(&self) {
        self.records_decoded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_kept(&self) {
        self.records_kept.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineCounts {
        PipelineCounts {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            records_decoded: self.records_decoded.load(Ordering::Relaxed),
            records_kept: self.records_kept.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PipelineCounts {
    pub lines_read: u64,
    pub records_decoded: u64,
    pub records_kept: u64,
}
