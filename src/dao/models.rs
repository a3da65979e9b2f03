//! Entities written to and read from the snapshot store.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identity of a court snapshot: `club:date:court_no`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CourtKey {
    /// Club the court belongs to.
    pub club_id: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Court number within the session.
    pub court_no: u32,
}

impl fmt::Display for CourtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.club_id, self.date, self.court_no)
    }
}

/// Player as stored inside court and pool snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantEntity {
    /// Roster id or generated guest id.
    pub id: String,
    /// Name shown on the board.
    pub display_name: String,
    /// `Male` or `Female`.
    pub gender: String,
    /// Optional avatar reference from the roster.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    /// Whether the player was added as a guest.
    #[serde(default)]
    pub is_guest: bool,
}

/// Durable mirror of one non-idle court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtSnapshotEntity {
    /// Owning club.
    pub club_id: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Court number within the session.
    pub court_no: u32,
    /// Four slots; team A is slots 0-1, team B slots 2-3.
    pub assigned: Vec<Option<OccupantEntity>>,
    /// Whether the match clock was running when written.
    #[serde(default)]
    pub is_running: bool,
    /// Wall-clock start baseline in epoch milliseconds; restore ignores it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<u64>,
    /// Elapsed match time at the moment of writing.
    #[serde(default)]
    pub last_elapsed_ms: u64,
    /// Live score text.
    #[serde(default)]
    pub score: String,
    /// Category code of the current match, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl CourtSnapshotEntity {
    /// Store key of this snapshot.
    pub fn key(&self) -> CourtKey {
        CourtKey {
            club_id: self.club_id.clone(),
            date: self.date.clone(),
            court_no: self.court_no,
        }
    }
}

/// Waiting queue of one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshotEntity {
    /// Owning club.
    pub club_id: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Waiting players, front first.
    #[serde(default)]
    pub players: Vec<OccupantEntity>,
}

/// Players already reported present for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedSnapshotEntity {
    /// Owning club.
    pub club_id: String,
    /// Session date as `YYYY-MM-DD`.
    pub date: String,
    /// Ids already reported to the attendance service.
    #[serde(default)]
    pub player_ids: Vec<String>,
}

/// Undecoded snapshot as listed by a store; decoding happens per entry so one
/// corrupt document cannot hide the others.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSnapshot {
    /// Document id.
    pub key: String,
    /// Document body as stored.
    pub value: Value,
}

/// Whether a stored document belongs to a day other than `today`.
///
/// Documents without a readable `date` are treated as stale.
pub fn is_stale(value: &Value, today: &str) -> bool {
    value.get("date").and_then(Value::as_str) != Some(today)
}
