//! Per-court match clock tasks.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    dao::snapshot_store::writer::SnapshotWrite,
    services::sse_events,
    state::{
        SharedState,
        clock::{TICK_MS, TICK_PERIOD},
        court::CourtNo,
    },
};

/// Spawn the 1-second ticker of a court, replacing any previous one.
///
/// The task only holds a weak reference to the state and ends on its own once the
/// clock generation it was started with is superseded.
pub fn spawn_clock(state: &SharedState, court_no: CourtNo, generation: u64) {
    let weak = Arc::downgrade(state);
    state
        .clocks()
        .spawn_periodic(court_no, TICK_PERIOD, move || {
            let weak = weak.clone();
            async move {
                match weak.upgrade() {
                    Some(state) => tick(&state, court_no, generation).await,
                    None => false,
                }
            }
        });
}

/// Add one tick to a running clock. Returns `false` when the clock is gone or stale.
async fn tick(state: &SharedState, court_no: CourtNo, generation: u64) -> bool {
    let elapsed_ms = {
        let mut board = state.board().write().await;
        let Some(elapsed_ms) = board.tick(court_no, generation) else {
            trace!(court_no, generation, "stale clock tick ignored");
            return false;
        };
        let ticks = elapsed_ms / TICK_MS;
        if ticks % state.config().persist_every_ticks.max(1) == 0
            && let Some(snapshot) = board.court_snapshot(court_no)
        {
            state.writer().enqueue(SnapshotWrite::PutCourt(snapshot));
        }
        elapsed_ms
    };
    trace!(court_no, elapsed_ms, "clock tick");
    sse_events::broadcast_clock_tick(state, court_no, elapsed_ms);
    true
}

/// Stop every ticker and write the final elapsed time of each running court.
///
/// Called on shutdown; returns once the snapshot writer has drained.
pub async fn checkpoint_and_stop(state: &SharedState) {
    state.clocks().cancel_all();
    let snapshots: Vec<_> = {
        let board = state.board().read().await;
        board
            .courts()
            .iter()
            .filter(|court| court.clock().is_running())
            .filter_map(|court| board.court_snapshot(court.court_no()))
            .collect()
    };
    debug!(running = snapshots.len(), "checkpointing running clocks");
    for snapshot in snapshots {
        state.writer().enqueue(SnapshotWrite::PutCourt(snapshot));
    }
    state.writer().flush().await;
}
