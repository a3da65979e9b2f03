//! Boundaries to the club's external services.
//!
//! The engine only talks to these traits; HTTP implementations are used when an
//! endpoint is configured and no-op ones otherwise.

pub mod error;
#[cfg(feature = "http-integrations")]
pub mod http;
pub mod models;
pub mod noop;

use std::sync::Arc;

use futures::future::BoxFuture;

pub use self::error::{IntegrationError, IntegrationResult};
use self::models::{
    AttendanceBatch, AttendanceRecord, MatchReport, RosterPlayer, SuggestionOption,
    SuggestionRequest,
};
use crate::config::IntegrationsConfig;

/// Source of club members.
pub trait RosterService: Send + Sync {
    /// Every member of `club_id`.
    fn fetch_players(
        &self,
        club_id: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<RosterPlayer>>>;
}

/// Attendance register.
pub trait AttendanceService: Send + Sync {
    /// Report a batch of players present.
    fn mark_present(&self, batch: AttendanceBatch) -> BoxFuture<'static, IntegrationResult<()>>;
    /// Records already registered for `club_id` on `date`.
    fn present_records(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<AttendanceRecord>>>;
}

/// Ranked line-up suggestions.
pub trait SuggestionService: Send + Sync {
    /// Ranked groupings for the requested category.
    fn suggest(
        &self,
        request: SuggestionRequest,
    ) -> BoxFuture<'static, IntegrationResult<Vec<SuggestionOption>>>;
}

/// Archive of finished matches.
pub trait MatchHistoryService: Send + Sync {
    /// File one finished match.
    fn record(&self, report: MatchReport) -> BoxFuture<'static, IntegrationResult<()>>;
}

/// The set of collaborators wired into the application.
#[derive(Clone)]
pub struct Integrations {
    /// Member roster.
    pub roster: Arc<dyn RosterService>,
    /// Attendance register.
    pub attendance: Arc<dyn AttendanceService>,
    /// Line-up suggestions.
    pub suggestions: Arc<dyn SuggestionService>,
    /// Match history.
    pub match_history: Arc<dyn MatchHistoryService>,
}

impl Integrations {
    /// Every collaborator replaced by a no-op.
    pub fn disabled() -> Self {
        let noop = Arc::new(noop::NoopIntegrations);
        Self {
            roster: noop.clone(),
            attendance: noop.clone(),
            suggestions: noop.clone(),
            match_history: noop,
        }
    }

    /// HTTP collaborators for every configured endpoint, no-ops for the rest.
    #[cfg(feature = "http-integrations")]
    pub fn from_config(config: &IntegrationsConfig) -> IntegrationResult<Self> {
        let client = http::HttpClient::new(config.api_token.clone())?;
        let mut integrations = Self::disabled();
        if let Some(url) = &config.roster_url {
            integrations.roster = Arc::new(http::HttpRoster::new(client.clone(), url));
        }
        if let Some(url) = &config.attendance_url {
            integrations.attendance = Arc::new(http::HttpAttendance::new(client.clone(), url));
        }
        if let Some(url) = &config.suggestions_url {
            integrations.suggestions = Arc::new(http::HttpSuggestions::new(client.clone(), url));
        }
        if let Some(url) = &config.match_history_url {
            integrations.match_history = Arc::new(http::HttpMatchHistory::new(client, url));
        }
        Ok(integrations)
    }

    /// Without the HTTP clients only an empty configuration is accepted.
    #[cfg(not(feature = "http-integrations"))]
    pub fn from_config(config: &IntegrationsConfig) -> IntegrationResult<Self> {
        if config.is_empty() {
            Ok(Self::disabled())
        } else {
            Err(IntegrationError::NotConfigured("http"))
        }
    }
}
