//! Shared application state and the board model behind it.

pub mod assignment;
pub mod board;
pub mod clock;
pub mod court;
pub mod errors;
pub mod pool;
pub mod scheduler;
pub mod score;
pub mod session;
pub mod snapshot;
mod sse;

use std::{
    collections::HashMap,
    sync::Arc,
};

use dashmap::DashSet;
use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig,
    dao::snapshot_store::{SnapshotStore, StoreSlot, writer::SnapshotWriter},
    error::ServiceError,
    integrations::Integrations,
    state::{
        board::Board,
        court::CourtNo,
        pool::{Player, PlayerId},
        scheduler::TaskRegistry,
        session::today,
    },
};

pub use self::errors::BoardError;
pub use self::sse::{SSE_CAPACITY, SseHub};

/// Handle to the application state shared by routes and background tasks.
pub type SharedState = Arc<AppState>;

/// Collaborator failures surfaced to screens at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    /// Attendance reporting failed.
    Attendance,
    /// Filing a match result failed.
    MatchHistory,
    /// The roster could not be loaded.
    Roster,
    /// The suggestion service failed.
    Suggestions,
}

impl NoticeKind {
    /// Code sent in notice events.
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Attendance => "attendance",
            NoticeKind::MatchHistory => "match_history",
            NoticeKind::Roster => "roster",
            NoticeKind::Suggestions => "suggestions",
        }
    }
}

/// Central application state: the board, its store and the background machinery around it.
pub struct AppState {
    config: AppConfig,
    board: RwLock<Board>,
    snapshot_store: StoreSlot,
    writer: SnapshotWriter,
    clocks: TaskRegistry<CourtNo>,
    integrations: Integrations,
    roster: RwLock<HashMap<PlayerId, Player>>,
    sse: SseHub,
    notices: DashSet<NoticeKind>,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Spawns the snapshot writer, so it must be called from within a Tokio runtime.
    /// The application starts in degraded mode until a snapshot store is installed.
    pub fn new(config: AppConfig, integrations: Integrations) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let snapshot_store: StoreSlot = Arc::new(RwLock::new(None));
        let board = Board::new(config.club_id.clone(), today(), config.candidate_window);
        Arc::new(Self {
            board: RwLock::new(board),
            writer: SnapshotWriter::spawn(snapshot_store.clone()),
            snapshot_store,
            clocks: TaskRegistry::new(),
            integrations,
            roster: RwLock::new(HashMap::new()),
            sse: SseHub::new(SSE_CAPACITY),
            notices: DashSet::new(),
            degraded: degraded_tx,
            config,
        })
    }

    /// Configuration the application was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The board; every mutation goes through its write lock.
    pub fn board(&self) -> &RwLock<Board> {
        &self.board
    }

    /// Obtain a handle to the current snapshot store, if one is installed.
    pub async fn snapshot_store(&self) -> Option<Arc<dyn SnapshotStore>> {
        let guard = self.snapshot_store.read().await;
        guard.as_ref().cloned()
    }

    /// Current snapshot store or [`ServiceError::Degraded`].
    pub async fn require_snapshot_store(&self) -> Result<Arc<dyn SnapshotStore>, ServiceError> {
        self.snapshot_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a snapshot store and leave degraded mode.
    pub async fn install_snapshot_store(&self, store: Arc<dyn SnapshotStore>) {
        {
            let mut guard = self.snapshot_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current snapshot store and enter degraded mode.
    pub async fn clear_snapshot_store(&self) {
        {
            let mut guard = self.snapshot_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub(crate) async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Ordered writer mirroring the board to the store.
    pub fn writer(&self) -> &SnapshotWriter {
        &self.writer
    }

    /// Clock tasks keyed by court number.
    pub fn clocks(&self) -> &TaskRegistry<CourtNo> {
        &self.clocks
    }

    /// External collaborators.
    pub fn integrations(&self) -> &Integrations {
        &self.integrations
    }

    /// Roster members fetched from the roster collaborator, by id.
    pub fn roster(&self) -> &RwLock<HashMap<PlayerId, Player>> {
        &self.roster
    }

    /// Broadcast hub used for the board SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    /// Claim the right to show a notice of `kind`; `false` once already shown this session.
    pub fn claim_notice(&self, kind: NoticeKind) -> bool {
        self.notices.insert(kind)
    }

    /// Allow every notice to be shown again, e.g. on a new day.
    pub fn reset_notices(&self) {
        self.notices.clear();
    }
}
