use serde::Serialize;
use tracing::{info, warn};

use crate::{
    dto::{
        board::{BoardView, MatchResultView},
        sse::{ClockTickEvent, NoticeEvent, ServerEvent, SystemStatus},
    },
    state::{NoticeKind, SharedState, clock::format_elapsed, court::CourtNo, score::MatchResult},
};

const EVENT_BOARD_UPDATED: &str = "board.updated";
const EVENT_CLOCK_TICK: &str = "clock.tick";
const EVENT_MATCH_FINALIZED: &str = "match.finalized";
const EVENT_NOTICE: &str = "notice";
const EVENT_SYSTEM_STATUS: &str = "system_status";

/// Broadcast the full board to every screen.
pub fn broadcast_board(state: &SharedState, view: &BoardView) {
    send_public_event(state, EVENT_BOARD_UPDATED, view);
}

/// Broadcast the elapsed time of one running court.
pub fn broadcast_clock_tick(state: &SharedState, court_no: CourtNo, elapsed_ms: u64) {
    let payload = ClockTickEvent {
        court_no,
        elapsed_ms,
        elapsed: format_elapsed(elapsed_ms),
    };
    send_public_event(state, EVENT_CLOCK_TICK, &payload);
}

/// Broadcast a finalized match result.
pub fn broadcast_match_finalized(state: &SharedState, result: &MatchResult) {
    send_public_event(state, EVENT_MATCH_FINALIZED, &MatchResultView::from(result));
}

/// Surface a collaborator failure once per session.
///
/// Later failures of the same kind are only logged.
pub fn broadcast_notice(state: &SharedState, kind: NoticeKind, message: impl Into<String>) {
    let message = message.into();
    if !state.claim_notice(kind) {
        return;
    }
    info!(kind = kind.as_str(), %message, "surfacing notice");
    let payload = NoticeEvent {
        kind: kind.as_str().to_string(),
        message,
    };
    send_public_event(state, EVENT_NOTICE, &payload);
}

/// Broadcast a change of the degraded flag.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    send_public_event(state, EVENT_SYSTEM_STATUS, &SystemStatus { degraded });
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => state.sse().broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
