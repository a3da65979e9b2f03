//! Rejections raised by board operations.

use thiserror::Error;

use crate::state::{assignment::Category, court::CourtNo, score::ScoreError};

/// Reasons a board operation can be rejected. A rejected operation leaves the board untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Auto or smart assignment needs an idle court: four empty slots and a stopped clock.
    #[error("no free court available")]
    NoFreeCourt,
    /// Not enough eligible players remain in the pool for the category.
    #[error("not enough eligible players in the pool for {category}")]
    InsufficientPlayers {
        /// Category that could not be filled.
        category: Category,
    },
    /// Guest names must contain at least one non-whitespace character.
    #[error("guest name must not be empty")]
    EmptyGuestName,
    /// Referenced court does not exist.
    #[error("court {0} not found")]
    CourtNotFound(CourtNo),
    /// Slot index outside `0..4`.
    #[error("slot {0} is out of range")]
    SlotOutOfRange(usize),
    /// Pool index outside the current pool length.
    #[error("pool index {index} is out of range (pool has {len} players)")]
    PoolIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Pool length at the time of the request.
        len: usize,
    },
    /// Player id is unknown to the pool, the courts or the roster.
    #[error("player `{0}` not found")]
    PlayerNotFound(String),
    /// The player is no longer at the position the transfer was computed from.
    #[error("player `{0}` is not at the stated source position")]
    StaleTransfer(String),
    /// The court has no occupant.
    #[error("court {0} has no players")]
    CourtEmpty(CourtNo),
    /// Start requested on a clock that already runs.
    #[error("clock of court {0} is already running")]
    ClockAlreadyRunning(CourtNo),
    /// Stop requested on an idle clock.
    #[error("clock of court {0} is not running")]
    ClockNotRunning(CourtNo),
    /// Confirm, redo or cancel without a pending preview.
    #[error("no assignment preview is pending")]
    NoPendingPreview,
    /// Plan id does not match the pending preview.
    #[error("assignment preview does not match the pending one")]
    PreviewMismatch,
    /// The players or the court of the preview are no longer available.
    #[error("assignment preview is stale: {0}")]
    PreviewStale(String),
    /// The suggestion collaborator returned no usable grouping.
    #[error("no usable suggestion for {category}")]
    NoSuggestions {
        /// Requested category.
        category: Category,
    },
    /// The submitted score is not a terminal badminton score.
    #[error("invalid score: {0}")]
    InvalidScore(#[from] ScoreError),
}

impl BoardError {
    /// Stable reason code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            BoardError::NoFreeCourt => "NoFreeCourt",
            BoardError::InsufficientPlayers { .. } => "InsufficientPlayers",
            BoardError::EmptyGuestName => "EmptyGuestName",
            BoardError::CourtNotFound(_) => "CourtNotFound",
            BoardError::SlotOutOfRange(_) => "SlotOutOfRange",
            BoardError::PoolIndexOutOfRange { .. } => "PoolIndexOutOfRange",
            BoardError::PlayerNotFound(_) => "PlayerNotFound",
            BoardError::StaleTransfer(_) => "StaleTransfer",
            BoardError::CourtEmpty(_) => "CourtEmpty",
            BoardError::ClockAlreadyRunning(_) => "ClockAlreadyRunning",
            BoardError::ClockNotRunning(_) => "ClockNotRunning",
            BoardError::NoPendingPreview => "NoPendingPreview",
            BoardError::PreviewMismatch => "PreviewMismatch",
            BoardError::PreviewStale(_) => "PreviewStale",
            BoardError::NoSuggestions { .. } => "NoSuggestions",
            BoardError::InvalidScore(err) => err.code(),
        }
    }
}
