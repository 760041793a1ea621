use super::{TickOutcome, WorkflowViewer};
use crate::backend::ExecutionBackend;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

const STOP_CHECK_STEP_MS: u64 = 200;
const MIN_POLL_INTERVAL_MS: u64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub ticks: usize,
    /// Deadlines that passed while a fetch was still outstanding.
    pub skipped: usize,
}

/// Sleeps in short steps so `stop` is honoured promptly. Returns `false`
/// when the flag was raised.
pub(crate) fn sleep_with_stop(stop: &AtomicBool, total: Duration) -> bool {
    let mut remaining = total;
    while remaining > Duration::from_millis(0) {
        if stop.load(Ordering::Relaxed) {
            return false;
        }
        let step = remaining.min(Duration::from_millis(STOP_CHECK_STEP_MS));
        thread::sleep(step);
        remaining = remaining.saturating_sub(step);
    }
    !stop.load(Ordering::Relaxed)
}

/// Polls on the calling thread: one tick immediately, then one per
/// `interval`. Ticks never overlap; a deadline missed by a slow fetch is
/// dropped instead of queued. Returns once `stop` is raised or the viewer
/// leaves the polling state.
pub fn run_polling<B, F>(
    viewer: &mut WorkflowViewer,
    backend: &B,
    interval: Duration,
    stop: &AtomicBool,
    mut on_tick: F,
) -> PollSummary
where
    B: ExecutionBackend + ?Sized,
    F: FnMut(&WorkflowViewer, &TickOutcome),
{
    let interval = interval.max(Duration::from_millis(MIN_POLL_INTERVAL_MS));
    let mut summary = PollSummary::default();
    let mut deadline = Instant::now();

    while !stop.load(Ordering::Relaxed) && viewer.is_polling() {
        let outcome = viewer.tick(backend);
        summary.ticks += 1;
        on_tick(viewer, &outcome);
        if !viewer.is_polling() {
            break;
        }

        deadline += interval;
        let now = Instant::now();
        while deadline <= now {
            deadline += interval;
            summary.skipped += 1;
        }
        if !sleep_with_stop(stop, deadline - now) {
            break;
        }
    }
    summary
}
