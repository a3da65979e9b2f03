//! Session recovery from the snapshot store and the day rollover.

use time::Date;
use tracing::{info, warn};

use crate::{
    dao::{snapshot_store::SnapshotStore, storage::StorageResult},
    dto::board::BoardView,
    error::ServiceError,
    services::{attendance_notifier, board_service, sse_events},
    state::{
        SharedState,
        board::RestoredSession,
        session::{format_date, now_ms},
        snapshot::{decode_court, decode_notified, decode_pool},
    },
};

/// Outcome of reconciling the local board with the snapshot store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The board was pristine and has been rebuilt from the store.
    Restored {
        /// Courts rebuilt.
        courts: usize,
        /// Courts whose clock resumed.
        running: usize,
        /// Players put back into the pool.
        pool: usize,
    },
    /// The local board had live data; it was written over the store.
    Mirrored,
}

/// Read every snapshot of one session, skipping entries that cannot be decoded.
pub async fn load_session(
    store: &dyn SnapshotStore,
    club_id: &str,
    date: &str,
) -> StorageResult<RestoredSession> {
    let mut session = RestoredSession::default();

    for raw in store.list_courts(club_id.to_string(), date.to_string()).await? {
        let key = raw.key.clone();
        match decode_court(raw) {
            Ok(court) => session.courts.push(court),
            Err(err) => warn!(%key, error = %err, "skipping corrupt court snapshot"),
        }
    }

    if let Some(raw) = store.find_pool(club_id.to_string(), date.to_string()).await? {
        let key = raw.key.clone();
        match decode_pool(raw) {
            Ok(players) => session.pool = players,
            Err(err) => warn!(%key, error = %err, "skipping corrupt pool snapshot"),
        }
    }

    if let Some(raw) = store.find_notified(club_id.to_string(), date.to_string()).await? {
        let key = raw.key.clone();
        match decode_notified(raw) {
            Ok(ids) => session.notified = ids,
            Err(err) => warn!(%key, error = %err, "skipping corrupt notified snapshot"),
        }
    }

    Ok(session)
}

/// Reconcile the board with a freshly installed store.
///
/// A pristine board is restored from the store; a board holding live data is written
/// over the store instead, as writes were skipped while it was unreachable.
pub async fn sync_with_store(state: &SharedState) -> Result<SyncOutcome, ServiceError> {
    let store = state.require_snapshot_store().await?;
    let (club_id, date) = {
        let board = state.board().read().await;
        (board.session().club_id().to_string(), board.session().date_key())
    };
    let session = load_session(store.as_ref(), &club_id, &date).await?;

    let (outcome, view) = {
        let mut board = state.board().write().await;
        let outcome = if board.is_blank() && board.session().date_key() == date {
            let report = board.restore(session, now_ms());
            let mut changes = report.changes;
            for (court_no, _) in &changes.started_clocks {
                changes.courts.insert(*court_no);
            }
            board_service::apply_changes(state, &board, &changes);
            if report.dropped_duplicates > 0 {
                warn!(
                    dropped = report.dropped_duplicates,
                    "duplicate players dropped during restore"
                );
            }
            SyncOutcome::Restored {
                courts: report.courts,
                running: report.running,
                pool: report.pool,
            }
        } else {
            let local = board.courts().numbers();
            let orphaned = session
                .courts
                .iter()
                .map(|restored| restored.court.court_no())
                .filter(|court_no| !local.contains(court_no));
            let mut changes = board.everything();
            changes.removed_courts.extend(orphaned);
            board.seed_notified(session.notified);
            board_service::apply_changes(state, &board, &changes);
            SyncOutcome::Mirrored
        };
        (outcome, BoardView::from(&*board))
    };

    match outcome {
        SyncOutcome::Restored { courts, running, pool } => {
            info!(%club_id, %date, courts, running, pool, "session restored from snapshot store")
        }
        SyncOutcome::Mirrored => info!(%club_id, %date, "local board mirrored to snapshot store"),
    }
    sse_events::broadcast_board(state, &view);
    Ok(outcome)
}

/// Move the session to `date` when it differs from the current one.
///
/// Clears the pool and the notified cache, resets notices and re-mirrors live courts
/// under the new date. Returns `false` when the board already is on `date`.
pub async fn roll_over(state: &SharedState, date: Date) -> Result<bool, ServiceError> {
    let (rolled, _) = board_service::mutate(state, |board| {
        let changes = board.roll_over(date);
        Ok((!changes.is_empty(), changes))
    })
    .await?;
    if !rolled {
        return Ok(false);
    }

    state.reset_notices();
    info!(date = %format_date(date), "session rolled over to a new day");
    if let Err(err) = attendance_notifier::seed_from_attendance(state).await {
        warn!(error = %err, "attendance cache not seeded after rollover");
    }
    Ok(true)
}

/// Hook run by the storage supervisor each time a store is installed.
pub async fn on_store_installed(state: SharedState) {
    if let Err(err) = sync_with_store(&state).await {
        warn!(error = %err, "failed to reconcile board with snapshot store");
    }
}
