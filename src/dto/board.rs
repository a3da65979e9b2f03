//! Read models of the board pushed to screens and returned by every mutation.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    assignment::{AssignmentPlan, Category, LineUp, PlanKind},
    board::Board,
    clock::format_elapsed,
    court::Court,
    pool::{Gender, Player},
    score::{MatchResult, Team},
};

/// A player as shown on a court tile or in the pool list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerView {
    /// Roster id or generated guest id.
    pub id: String,
    /// Name shown on the tile.
    pub display_name: String,
    /// Gender used by category filtering.
    pub gender: Gender,
    /// Avatar reference from the roster.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_ref: Option<String>,
    /// Whether the player was added as a guest.
    pub is_guest: bool,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            display_name: player.display_name.clone(),
            gender: player.gender,
            avatar_ref: player.avatar_ref.clone(),
            is_guest: player.is_guest,
        }
    }
}

/// One court with its four slots and clock.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourtView {
    /// Court number, stable for the session.
    pub court_no: u32,
    /// Always four entries; team A is slots 0 and 1, team B slots 2 and 3.
    pub slots: Vec<Option<PlayerView>>,
    /// Whether the clock is ticking.
    pub is_running: bool,
    /// Elapsed match time in milliseconds.
    pub elapsed_ms: u64,
    /// Elapsed time rendered `MM:SS`.
    pub elapsed: String,
    /// Live score text.
    pub score: String,
    /// Category of the current match, if assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl From<&Court> for CourtView {
    fn from(court: &Court) -> Self {
        let elapsed_ms = court.clock().elapsed_ms();
        Self {
            court_no: court.court_no(),
            slots: court
                .slots()
                .iter()
                .map(|slot| slot.as_ref().map(PlayerView::from))
                .collect(),
            is_running: court.clock().is_running(),
            elapsed_ms,
            elapsed: format_elapsed(elapsed_ms),
            score: court.score().to_string(),
            category: court.category(),
        }
    }
}

/// One proposed line-up of a preview.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LineUpView {
    /// Ranking label of a suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Four proposed slots.
    pub slots: Vec<Option<PlayerView>>,
}

impl From<&LineUp> for LineUpView {
    fn from(line_up: &LineUp) -> Self {
        Self {
            label: line_up.label.clone(),
            slots: line_up
                .slots
                .iter()
                .map(|slot| slot.as_ref().map(PlayerView::from))
                .collect(),
        }
    }
}

/// Origin of a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    /// Random draw around the first pool player.
    Auto,
    /// Ranked options from the suggestion service.
    Smart,
}

/// Pending assignment preview awaiting confirm, redo or cancel.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PreviewView {
    /// Identifier the confirm, redo and cancel calls must echo.
    pub plan_id: Uuid,
    /// How the preview was produced.
    pub kind: PreviewKind,
    /// Court the preview targets.
    pub court_no: u32,
    /// Requested category.
    pub category: Category,
    /// Line-ups to choose from.
    pub options: Vec<LineUpView>,
    /// Non-fatal remark, e.g. the first player does not fit the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<&AssignmentPlan> for PreviewView {
    fn from(plan: &AssignmentPlan) -> Self {
        let (kind, warning) = match &plan.kind {
            PlanKind::Auto { warning, .. } => (PreviewKind::Auto, warning.clone()),
            PlanKind::Smart => (PreviewKind::Smart, None),
        };
        Self {
            plan_id: plan.id,
            kind,
            court_no: plan.court_no,
            category: plan.category,
            options: plan.options.iter().map(LineUpView::from).collect(),
            warning,
        }
    }
}

/// Full board as displayed on club night.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardView {
    /// Club of the session.
    pub club_id: String,
    /// Session date, `YYYY-MM-DD`.
    pub date: String,
    /// Courts in ascending number.
    pub courts: Vec<CourtView>,
    /// Waiting players, front first.
    pub pool: Vec<PlayerView>,
    /// Pending preview, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<PreviewView>,
}

impl From<&Board> for BoardView {
    fn from(board: &Board) -> Self {
        Self {
            club_id: board.session().club_id().to_string(),
            date: board.session().date_key(),
            courts: board.courts().iter().map(CourtView::from).collect(),
            pool: board.pool().iter().map(PlayerView::from).collect(),
            preview: board.preview().map(PreviewView::from),
        }
    }
}

/// Finalized match as returned to the caller and broadcast to screens.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MatchResultView {
    /// Court the match was played on.
    pub court_no: u32,
    /// Category of the match, if assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Slots 0 and 1 at the end of the match.
    pub team_a: Vec<PlayerView>,
    /// Slots 2 and 3 at the end of the match.
    pub team_b: Vec<PlayerView>,
    /// `NN/NN`, team A first.
    pub final_score: String,
    /// `A` or `B`.
    pub winner: String,
    /// Clock reading at the end, in whole seconds.
    pub duration_seconds: u64,
}

impl From<&MatchResult> for MatchResultView {
    fn from(result: &MatchResult) -> Self {
        Self {
            court_no: result.court_no,
            category: result.category,
            team_a: result.team_a.iter().map(PlayerView::from).collect(),
            team_b: result.team_b.iter().map(PlayerView::from).collect(),
            final_score: result.final_score(),
            winner: match result.winner() {
                Team::A => "A".to_string(),
                Team::B => "B".to_string(),
            },
            duration_seconds: result.duration_seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::state::{assignment::DEFAULT_CANDIDATE_WINDOW, pool::player};

    #[test]
    fn board_view_lists_four_slots_per_court() {
        let mut board = Board::new("club", date!(2024 - 05 - 01), DEFAULT_CANDIDATE_WINDOW);
        board.add_player(player("m1", Gender::Male));
        let view = BoardView::from(&board);
        assert_eq!(view.date, "2024-05-01");
        assert_eq!(view.courts.len(), 1);
        assert_eq!(view.courts[0].slots.len(), 4);
        assert_eq!(view.courts[0].elapsed, "00:00");
        assert_eq!(view.pool[0].display_name, "M1");
        assert!(view.preview.is_none());
    }
}
