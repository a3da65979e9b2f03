use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report degraded mode and board occupancy while logging store connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_snapshot_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "snapshot store health check failed");
            }
        }
        Err(_) => warn!("snapshot store unavailable (degraded mode)"),
    }

    let degraded = state.is_degraded().await;
    let board = state.board().read().await;
    let running = board
        .courts()
        .iter()
        .filter(|court| court.clock().is_running())
        .count();
    HealthResponse::new(
        degraded,
        board.session().club_id().to_string(),
        board.session().date_key(),
    )
    .with_courts(board.courts().len(), running)
}
