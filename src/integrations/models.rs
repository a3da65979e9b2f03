//! Wire contracts of the external collaborators.

use serde::{Deserialize, Serialize};

use crate::state::{
    assignment::{Category, SuggestedGrouping},
    pool::{Gender, Player},
};

/// Member record as served by the roster service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPlayer {
    /// Member id.
    pub id: String,
    /// Given name.
    #[serde(default)]
    pub first_name: String,
    /// Family name.
    #[serde(default)]
    pub sur_name: String,
    /// `Male` or `Female`; anything else makes the member unusable.
    pub gender: String,
    /// Avatar reference.
    #[serde(default, alias = "profileImage")]
    pub avatar_ref: Option<String>,
    /// Membership type, passed through.
    #[serde(default)]
    pub player_type: Option<String>,
    /// Club roles, passed through.
    #[serde(default)]
    pub club_roles: Vec<String>,
}

impl RosterPlayer {
    /// First and last name, trimmed.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.sur_name.trim())
            .trim()
            .to_string()
    }

    /// Board player for this member; `None` when the roster gender is not usable.
    pub fn to_player(&self) -> Option<Player> {
        Some(Player {
            id: self.id.clone(),
            display_name: self.display_name(),
            gender: Gender::parse(&self.gender)?,
            avatar_ref: self.avatar_ref.clone(),
            is_guest: false,
        })
    }
}

/// One attendance line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Member reported.
    pub player_id: String,
    /// Session date, `YYYY-MM-DD`.
    pub date: String,
    /// Weekday name.
    #[serde(default)]
    pub day: String,
    /// Attendance status, see [`STATUS_PRESENT`].
    pub status: String,
}

/// Attendance status reported for players added to the pool.
pub const STATUS_PRESENT: &str = "Present";

/// Attendance lines sent in one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceBatch {
    /// Lines of the batch.
    pub records: Vec<AttendanceRecord>,
    /// Club the batch belongs to.
    pub club_id: String,
}

/// Compact player entry sent to the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPlayer {
    /// Player id.
    pub id: String,
    /// Player gender.
    pub gender: Gender,
    /// Whether the player is a guest.
    pub is_guest: bool,
}

impl From<&Player> for SuggestionPlayer {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            gender: player.gender,
            is_guest: player.is_guest,
        }
    }
}

/// Occupancy of one court, slot by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionCourt {
    /// Court number.
    pub court_no: u32,
    /// Occupant id per slot.
    pub player_ids: Vec<Option<String>>,
}

/// Board context sent to the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Requesting club.
    pub club_id: String,
    /// Waiting players, front first.
    pub pool: Vec<SuggestionPlayer>,
    /// Current court occupancy.
    pub courts: Vec<SuggestionCourt>,
    /// Requested category.
    pub category: Category,
}

/// Ranked grouping returned by the suggestion service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionOption {
    /// Ranking label.
    pub label: String,
    /// Four player ids, team A first.
    #[serde(alias = "players")]
    pub player_ids: Vec<String>,
}

impl From<SuggestionOption> for SuggestedGrouping {
    fn from(option: SuggestionOption) -> Self {
        Self {
            label: option.label,
            player_ids: option.player_ids,
        }
    }
}

/// Player ids per side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchTeams {
    /// Slots 0 and 1.
    pub team_a: Vec<String>,
    /// Slots 2 and 3.
    pub team_b: Vec<String>,
}

/// Finished match as filed with the match-history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// Club of the session.
    pub club_id: String,
    /// Session date, `YYYY-MM-DD`.
    pub date: String,
    /// Court the match was played on.
    pub court_no: u32,
    /// Category, if assigned.
    pub category: Option<Category>,
    /// Both sides.
    pub teams: MatchTeams,
    /// `NN/NN`, team A first.
    pub final_score: String,
    /// `A` or `B`.
    pub winner: String,
    /// Clock reading at the end, in whole seconds.
    pub duration_seconds: u64,
}
