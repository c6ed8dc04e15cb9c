use crate::pipeline::shutdown::{CancelSignal, Handoff, recv_or_cancel, send_or_cancel};
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::types::{Level, LogRecord};
use crossbeam_channel::{Receiver, Sender};

pub const HTTP_REQUEST_MESSAGE: &str = "http request";

/// Keep warnings, errors, and INFO records describing an HTTP request.
pub fn keep(record: &LogRecord) -> bool {
    match record.level {
        Level::Warn | Level::Error => true,
        Level::Info => record.message == HTTP_REQUEST_MESSAGE,
        Level::Debug | Level::Other(_) => false,
    }
}

pub(crate) fn run_filter(
    lane: usize,
    input: Receiver<LogRecord>,
    out: Sender<LogRecord>,
    cancel: CancelSignal,
    stats: &PipelineStats,
) {
    while let Some(record) = recv_or_cancel(&input, &cancel) {
        if !keep(&record) {
            continue;
        }

        stats.record_kept();
        if send_or_cancel(&out, record, &cancel) != Handoff::Delivered {
            break;
        }
    }

    tracing::trace!(lane, "filter lane finished");
}
