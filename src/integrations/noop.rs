//! Collaborators that do nothing, used when an endpoint is not configured.

use futures::future::BoxFuture;
use tracing::debug;

use super::{
    AttendanceService, IntegrationResult, MatchHistoryService, RosterService, SuggestionService,
    models::{
        AttendanceBatch, AttendanceRecord, MatchReport, RosterPlayer, SuggestionOption,
        SuggestionRequest,
    },
};

/// Stand-in for unconfigured collaborators: empty reads, writes accepted and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopIntegrations;

impl RosterService for NoopIntegrations {
    fn fetch_players(
        &self,
        _club_id: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<RosterPlayer>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

impl AttendanceService for NoopIntegrations {
    fn mark_present(&self, batch: AttendanceBatch) -> BoxFuture<'static, IntegrationResult<()>> {
        debug!(records = batch.records.len(), "attendance service not configured; dropping batch");
        Box::pin(async { Ok(()) })
    }

    fn present_records(
        &self,
        _club_id: String,
        _date: String,
    ) -> BoxFuture<'static, IntegrationResult<Vec<AttendanceRecord>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

impl SuggestionService for NoopIntegrations {
    fn suggest(
        &self,
        _request: SuggestionRequest,
    ) -> BoxFuture<'static, IntegrationResult<Vec<SuggestionOption>>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

impl MatchHistoryService for NoopIntegrations {
    fn record(&self, report: MatchReport) -> BoxFuture<'static, IntegrationResult<()>> {
        debug!(court_no = report.court_no, "match history service not configured; dropping result");
        Box::pin(async { Ok(()) })
    }
}
