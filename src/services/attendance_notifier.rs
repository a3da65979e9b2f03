//! Reports roster players present to the attendance service, once per player and day.
//!
//! The board's notified set is the in-memory half of the de-duplication cache; it is
//! mirrored to the snapshot store and seeded from it and from the attendance service.

use time::Date;
use tracing::{debug, info, warn};

use crate::{
    error::ServiceError,
    integrations::models::{AttendanceBatch, AttendanceRecord, STATUS_PRESENT},
    services::{board_service::mutate, sse_events},
    state::{NoticeKind, SharedState, pool::PlayerId, session::format_date},
};

/// Request "Present" for a player in the background. The pool add is never reverted.
pub fn dispatch_present(state: &SharedState, club_id: String, date: Date, player_id: PlayerId) {
    let batch = AttendanceBatch {
        records: vec![AttendanceRecord {
            player_id: player_id.clone(),
            date: format_date(date),
            day: date.weekday().to_string(),
            status: STATUS_PRESENT.to_string(),
        }],
        club_id,
    };
    let state = state.clone();
    tokio::spawn(async move {
        match state.integrations().attendance.mark_present(batch).await {
            Ok(()) => debug!(%player_id, "attendance reported"),
            Err(err) => {
                warn!(%player_id, error = %err, "failed to report attendance");
                sse_events::broadcast_notice(
                    &state,
                    NoticeKind::Attendance,
                    "Attendance could not be recorded; players stay in the pool",
                );
            }
        }
    });
}

/// Merge the ids the attendance service already holds as present today into the cache.
pub async fn seed_from_attendance(state: &SharedState) -> Result<usize, ServiceError> {
    let (club_id, date) = {
        let board = state.board().read().await;
        (board.session().club_id().to_string(), board.session().date_key())
    };
    let records = state
        .integrations()
        .attendance
        .present_records(club_id, date.clone())
        .await
        .inspect_err(|err| warn!(%date, error = %err, "failed to load present records"))?;

    let ids: Vec<PlayerId> = records
        .into_iter()
        .filter(|record| record.date.starts_with(date.as_str()))
        .map(|record| record.player_id)
        .collect();
    let count = ids.len();
    mutate(state, |board| {
        if board.session().date_key() != date {
            return Ok(((), Default::default()));
        }
        Ok(((), board.seed_notified(ids)))
    })
    .await?;
    info!(count, %date, "attendance cache seeded");
    Ok(count)
}
