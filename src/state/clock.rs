//! Match clock state machine.

use std::time::Duration;

use crate::state::{court::CourtNo, errors::BoardError};

/// Period of the per-court tick task.
pub const TICK_PERIOD: Duration = Duration::from_secs(1);
/// Elapsed milliseconds added by one tick.
pub const TICK_MS: u64 = 1_000;

/// Per-court match clock (`Idle -> Running -> Idle`).
///
/// Elapsed time grows only through ticks; the wall clock is read once, when the
/// clock starts, to derive the `started_at_ms` baseline shown to clients. Every
/// state change bumps `generation` so a tick scheduled for an earlier run is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchClock {
    running: bool,
    elapsed_ms: u64,
    started_at_ms: Option<u64>,
    generation: u64,
}

impl MatchClock {
    /// Clock restored from a snapshot, not yet running.
    pub fn with_elapsed(elapsed_ms: u64) -> Self {
        Self {
            elapsed_ms,
            ..Self::default()
        }
    }

    /// Whether ticks currently accrue.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Elapsed match time in milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Epoch milliseconds the current run is based on.
    pub fn started_at_ms(&self) -> Option<u64> {
        self.started_at_ms
    }

    /// Bumped on every start, stop and reset.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start (or resume) the clock; returns the generation the tick task must carry.
    pub fn start(&mut self, court_no: CourtNo, now_ms: u64) -> Result<u64, BoardError> {
        if self.running {
            return Err(BoardError::ClockAlreadyRunning(court_no));
        }
        self.running = true;
        self.started_at_ms = Some(now_ms.saturating_sub(self.elapsed_ms));
        self.generation += 1;
        Ok(self.generation)
    }

    /// Halt the clock, keeping the elapsed value on display.
    pub fn stop(&mut self, court_no: CourtNo) -> Result<(), BoardError> {
        if !self.running {
            return Err(BoardError::ClockNotRunning(court_no));
        }
        self.running = false;
        self.generation += 1;
        Ok(())
    }

    /// Apply one tick. Returns `false` when the tick belongs to a stale run.
    pub fn tick(&mut self, generation: u64) -> bool {
        if !self.running || generation != self.generation {
            return false;
        }
        self.elapsed_ms += TICK_MS;
        true
    }

    /// Back to a zeroed idle clock.
    pub fn reset(&mut self) {
        self.running = false;
        self.elapsed_ms = 0;
        self.started_at_ms = None;
        self.generation += 1;
    }
}

/// `MM:SS` rendering of an elapsed duration; minutes keep growing past an hour.
pub fn format_elapsed(elapsed_ms: u64) -> String {
    let seconds = elapsed_ms / 1_000;
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
