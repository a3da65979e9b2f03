//! Daily sweeps: day rollover of the session and purge of snapshots from other days.

use std::time::Duration;

use time::{OffsetDateTime, Time};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    error::ServiceError,
    services::session_service,
    state::{
        SharedState,
        session::{format_date, today},
    },
};

/// What a sweep did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Whether the session moved to a new date.
    pub rolled_over: bool,
    /// Documents deleted from the store.
    pub purged: usize,
}

/// Next instant at or after `now` whose UTC wall-clock time is `at`, strictly in the future.
pub fn next_run_after(now: OffsetDateTime, at: Time) -> OffsetDateTime {
    let candidate = now.replace_time(at);
    if candidate > now {
        candidate
    } else {
        candidate + time::Duration::DAY
    }
}

/// Roll the session over when the date changed, then purge every snapshot not dated today.
pub async fn sweep(state: &SharedState) -> Result<SweepReport, ServiceError> {
    let today = today();
    let rolled_over = session_service::roll_over(state, today).await?;

    let store = state.require_snapshot_store().await?;
    // Writes queued by the rollover must land before stale documents are selected.
    state.writer().flush().await;
    let purged = store.purge_stale(format_date(today)).await?;
    info!(rolled_over, purged, date = %format_date(today), "housekeeping sweep done");
    Ok(SweepReport { rolled_over, purged })
}

/// Run `sweep` every day at `at` (UTC).
async fn run_daily(state: SharedState, at: Time, label: &'static str) {
    loop {
        let now = OffsetDateTime::now_utc();
        let next = next_run_after(now, at);
        let wait = Duration::try_from(next - now).unwrap_or_default();
        sleep(wait).await;
        if let Err(err) = sweep(&state).await {
            warn!(sweep = label, error = %err, "housekeeping sweep failed");
        }
    }
}

/// Spawn the midnight purge and the midday safety sweep.
pub fn spawn(state: &SharedState) {
    let config = state.config();
    tokio::spawn(run_daily(state.clone(), config.midnight_sweep, "midnight"));
    tokio::spawn(run_daily(state.clone(), config.midday_sweep, "midday"));
}
