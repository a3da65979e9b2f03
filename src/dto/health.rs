//! Health check payload.

use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Configured club.
    pub club_id: String,
    /// Session date, `YYYY-MM-DD`.
    pub date: String,
    /// Courts on the board.
    pub courts: usize,
    /// Courts whose clock is running.
    pub running_clocks: usize,
}

impl HealthResponse {
    /// Status for the given mode with no court counts yet.
    pub fn new(degraded: bool, club_id: String, date: String) -> Self {
        Self {
            status: if degraded { "degraded" } else { "ok" }.to_string(),
            club_id,
            date,
            courts: 0,
            running_clocks: 0,
        }
    }

    /// Attach the court counters.
    pub fn with_courts(mut self, courts: usize, running_clocks: usize) -> Self {
        self.courts = courts;
        self.running_clocks = running_clocks;
        self
    }
}
