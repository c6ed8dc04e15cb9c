use crate::pipeline::failure::{FailureCause, FailureSink, Stage};
use crate::pipeline::shutdown::{CancelSignal, Handoff, recv_or_cancel, send_or_cancel};
use crate::pipeline::stats::PipelineStats;
use crate::pipeline::types::{LogRecord, RawLine};
use crossbeam_channel::{Receiver, Sender};

pub fn decode_line(raw: &RawLine) -> Result<LogRecord, FailureCause> {
    serde_json::from_str(&raw.text).map_err(|source| FailureCause::Decode {
        line_no: raw.line_no,
        line: raw.text.clone(),
        source,
    })
}

/// One parser lane. Competes with its siblings for lines on the shared `input`
/// and forwards decoded records on its own `out` lane.
pub(crate) fn run_parser(
    lane: usize,
    input: Receiver<RawLine>,
    out: Sender<LogRecord>,
    failures: FailureSink,
    cancel: CancelSignal,
    stats: &PipelineStats,
) {
    while let Some(raw) = recv_or_cancel(&input, &cancel) {
        let record = match decode_line(&raw) {
            Ok(record) => record,
            Err(cause) => {
                failures.report(Stage::Parse { lane }, cause);
                continue;
            }
        };

        stats.record_decoded();
        if send_or_cancel(&out, record, &cancel) != Handoff::Delivered {
            break;
        }
    }

    tracing::trace!(lane, "parser lane finished");
}
