use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{snapshot_store::SnapshotStore, storage::StorageError},
    services::{session_service, sse_events},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the snapshot store and keep the shared state in degraded mode while it is
/// unavailable.
///
/// Every time the store becomes usable again the board is reconciled with it.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn SnapshotStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_snapshot_store(store.clone()).await;
                info!("snapshot store connected; leaving degraded mode");
                sse_events::broadcast_system_status(&state, false);
                session_service::on_store_installed(state.clone()).await;
                delay = INITIAL_DELAY;

                loop {
                    match store.health_check().await {
                        Ok(()) => sleep(HEALTH_POLL_INTERVAL).await,
                        Err(err) => {
                            warn!(error = %err, "snapshot store health check failed");
                            let mut attempt = 0;
                            let mut reconnect_delay = INITIAL_DELAY;
                            let mut reconnected = false;

                            while attempt < MAX_RECONNECT_ATTEMPTS {
                                match store.try_reconnect().await {
                                    Ok(()) => {
                                        info!(
                                            "snapshot store reconnected after health check failure"
                                        );
                                        reconnected = true;
                                        break;
                                    }
                                    Err(reconnect_err) => {
                                        if attempt == 0 {
                                            warn!(
                                                attempt, error = %reconnect_err,
                                                "snapshot store unreachable; entering degraded mode"
                                            );
                                            state.clear_snapshot_store().await;
                                            sse_events::broadcast_system_status(&state, true);
                                        } else {
                                            warn!(
                                                attempt, error = %reconnect_err,
                                                "snapshot store reconnect attempt failed"
                                            );
                                        };
                                        attempt += 1;
                                        sleep(reconnect_delay).await;
                                        reconnect_delay = (reconnect_delay * 2).min(MAX_DELAY);
                                    }
                                }
                            }

                            if reconnected {
                                if state.is_degraded().await {
                                    state.install_snapshot_store(store.clone()).await;
                                    sse_events::broadcast_system_status(&state, false);
                                    session_service::on_store_installed(state.clone()).await;
                                }
                                sleep(HEALTH_POLL_INTERVAL).await;
                                continue;
                            } else {
                                warn!(
                                    "snapshot store reconnect attempts exhausted; staying degraded"
                                );
                                break;
                            }
                        }
                    }
                }

                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
            Err(err) => {
                warn!(error = %err, "snapshot store connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
