use crate::pipeline::shutdown::{CancelSignal, Handoff, recv_or_cancel, send_or_cancel};
use crossbeam_channel::{Receiver, Sender};
use std::thread;

/// Fan every lane into `out`.
///
/// One reader thread per lane forwards items as they arrive, so there is no
/// ordering across lanes. The scope joins every reader before returning, and
/// `out` is dropped only then: the merged stream ends after the last lane does.
pub fn merge<T: Send>(lanes: Vec<Receiver<T>>, out: Sender<T>, cancel: &CancelSignal) {
    let lane_count = lanes.len();

    thread::scope(|scope| {
        for (lane, input) in lanes.into_iter().enumerate() {
            let out = &out;
            let spawned = thread::Builder::new()
                .name(format!("logpulse-merge-{lane}"))
                .spawn_scoped(scope, move || forward_lane(input, out, cancel));

            if let Err(e) = spawned {
                tracing::error!(lane, error = %e, "failed to spawn merge lane reader");
                cancel.cancel();
                break;
            }
        }
    });

    tracing::debug!(lanes = lane_count, "merge drained all lanes");
}

fn forward_lane<T>(input: Receiver<T>, out: &Sender<T>, cancel: &CancelSignal) {
    while let Some(item) = recv_or_cancel(&input, cancel) {
        if send_or_cancel(out, item, cancel) != Handoff::Delivered {
            break;
        }
    }
}
