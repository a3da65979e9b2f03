//! Peg board backend entrypoint wiring REST, SSE, the snapshot store and club collaborators.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pegboard_back::{
    config::AppConfig,
    dao::{
        snapshot_store::{SnapshotStore, memory::MemorySnapshotStore},
        storage::StorageError,
    },
    integrations::Integrations,
    routes,
    services::{attendance_notifier, clock_service, housekeeping, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let integrations =
        Integrations::from_config(&config.integrations).context("building collaborator clients")?;
    let app_state = AppState::new(config, integrations);

    spawn_store_supervisor(&app_state);
    housekeeping::spawn(&app_state);
    let seed_state = app_state.clone();
    tokio::spawn(async move {
        if let Err(err) = attendance_notifier::seed_from_attendance(&seed_state).await {
            warn!(error = %err, "attendance cache not seeded at startup");
        }
    });

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, club_id = %app_state.config().club_id, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    clock_service::checkpoint_and_stop(&app_state).await;
    Ok(())
}

/// Run the store supervisor against CouchDB when configured, the in-process store otherwise.
fn spawn_store_supervisor(state: &SharedState) {
    #[cfg(feature = "couch-store")]
    {
        use pegboard_back::dao::snapshot_store::couchdb::{CouchConfig, CouchSnapshotStore};

        match CouchConfig::from_env() {
            Ok(couch) => {
                info!(
                    base_url = %couch.base_url,
                    database = %couch.database,
                    "using CouchDB snapshot store"
                );
                tokio::spawn(storage_supervisor::run(state.clone(), move || {
                    let couch = couch.clone();
                    async move {
                        let store = CouchSnapshotStore::connect(couch)
                            .await
                            .map_err(StorageError::from)?;
                        Ok::<_, StorageError>(Arc::new(store) as Arc<dyn SnapshotStore>)
                    }
                }));
                return;
            }
            Err(err) => {
                info!(reason = %err, "CouchDB not configured; using in-memory snapshot store")
            }
        }
    }

    let memory = MemorySnapshotStore::new();
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let store: Arc<dyn SnapshotStore> = Arc::new(memory.clone());
        async move { Ok::<_, StorageError>(store) }
    }));
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
