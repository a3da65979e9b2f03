#![allow(dead_code)]

use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use pegboard_back::{
    config::AppConfig,
    dao::snapshot_store::{SnapshotStore, memory::MemorySnapshotStore},
    dto::sse::ServerEvent,
    integrations::{
        AttendanceService, IntegrationError, IntegrationResult, Integrations, MatchHistoryService,
        RosterService, SuggestionService,
        models::{
            AttendanceBatch, AttendanceRecord, MatchReport, RosterPlayer, SuggestionOption,
            SuggestionRequest,
        },
    },
    state::{AppState, SharedState},
};
use tokio::sync::broadcast;

pub const CLUB: &str = "club";

/// Club collaborators that record every call and can be told to fail.
#[derive(Default)]
pub struct FakeClub {
    pub members: Mutex<Vec<RosterPlayer>>,
    pub roster_down: AtomicBool,
    pub present_batches: Mutex<Vec<AttendanceBatch>>,
    pub present_records: Mutex<Vec<AttendanceRecord>>,
    pub attendance_down: AtomicBool,
    pub suggestions: Mutex<Vec<SuggestionOption>>,
    pub suggestion_requests: Mutex<Vec<SuggestionRequest>>,
    pub suggestions_down: AtomicBool,
    pub reports: Mutex<Vec<MatchReport>>,
}

fn outage(service: &str) -> IntegrationError {
    IntegrationError::RequestStatus {
        url: format!("http://{service}.test"),
        status: 503,
    }
}

impl FakeClub {
    pub fn with_members(members: Vec<RosterPlayer>) -> Arc<Self> {
        let club = Self::default();
        *club.members.lock().unwrap() = members;
        Arc::new(club)
    }

    pub fn integrations(self: &Arc<Self>) -> Integrations {
        Integrations {
            roster: self.clone(),
            attendance: self.clone(),
            suggestions: self.clone(),
            match_history: self.clone(),
        }
    }

    /// Player ids reported present, in call order.
    pub fn reported_present(&self) -> Vec<String> {
        self.present_batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|batch| batch.records.iter().map(|r| r.player_id.clone()))
            .collect()
    }

    pub fn reports(&self) -> Vec<MatchReport> {
        self.reports.lock().unwrap().clone()
    }
}

impl RosterService for FakeClub {
    fn fetch_players(
        &self,
        _club_id: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<RosterPlayer>>> {
        let result = if self.roster_down.load(Ordering::SeqCst) {
            Err(outage("roster"))
        } else {
            Ok(self.members.lock().unwrap().clone())
        };
        Box::pin(async move { result })
    }
}

impl AttendanceService for FakeClub {
    fn mark_present(&self, batch: AttendanceBatch) -> BoxFuture<'static, IntegrationResult<()>> {
        let result = if self.attendance_down.load(Ordering::SeqCst) {
            Err(outage("attendance"))
        } else {
            Ok(())
        };
        self.present_batches.lock().unwrap().push(batch);
        Box::pin(async move { result })
    }

    fn present_records(
        &self,
        _club_id: String,
        _date: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<AttendanceRecord>>> {
        let records = self.present_records.lock().unwrap().clone();
        Box::pin(async move { Ok(records) })
    }
}

impl SuggestionService for FakeClub {
    fn suggest(
        &self,
        request: SuggestionRequest,
    ) -> BoxFuture<'static, IntegrationResult<Vec<SuggestionOption>>> {
        self.suggestion_requests.lock().unwrap().push(request);
        let result = if self.suggestions_down.load(Ordering::SeqCst) {
            Err(outage("suggestions"))
        } else {
            Ok(self.suggestions.lock().unwrap().clone())
        };
        Box::pin(async move { result })
    }
}

impl MatchHistoryService for FakeClub {
    fn record(&self, report: MatchReport) -> BoxFuture<'static, IntegrationResult<()>> {
        self.reports.lock().unwrap().push(report);
        Box::pin(async { Ok(()) })
    }
}

pub fn member(id: &str, first_name: &str, gender: &str) -> RosterPlayer {
    RosterPlayer {
        id: id.to_string(),
        first_name: first_name.to_string(),
        sur_name: "Tester".to_string(),
        gender: gender.to_string(),
        avatar_ref: None,
        player_type: None,
        club_roles: Vec::new(),
    }
}

pub fn config() -> AppConfig {
    AppConfig {
        club_id: CLUB.to_string(),
        ..AppConfig::default()
    }
}

pub fn app(club: &Arc<FakeClub>) -> SharedState {
    AppState::new(config(), club.integrations())
}

pub fn app_with(config: AppConfig, club: &Arc<FakeClub>) -> SharedState {
    AppState::new(config, club.integrations())
}

/// Install `store` the way the storage supervisor does, without the reconnect loop.
pub async fn install(state: &SharedState, store: &MemorySnapshotStore) {
    let installed: Arc<dyn SnapshotStore> = Arc::new(store.clone());
    state.install_snapshot_store(installed).await;
}

pub async fn session_date(state: &SharedState) -> String {
    state.board().read().await.session().date_key()
}

pub async fn court_doc(state: &SharedState, court_no: u32) -> String {
    format!("court::{CLUB}:{}:{court_no}", session_date(state).await)
}

pub async fn pool_ids(state: &SharedState) -> Vec<String> {
    let board = state.board().read().await;
    board.pool().iter().map(|p| p.id.clone()).collect()
}

/// Wait for background tasks (attendance, match history) until `check` holds.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

/// Events received so far, without waiting.
pub fn drain(receiver: &mut broadcast::Receiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

pub fn named<'a>(events: &'a [ServerEvent], name: &str) -> Vec<&'a ServerEvent> {
    events
        .iter()
        .filter(|event| event.event.as_deref() == Some(name))
        .collect()
}
