//! Transfer intents, match categories and the auto/smart assignment previews.

use std::{fmt, str::FromStr};

use rand::{Rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    court::{CourtNo, SLOTS_PER_COURT},
    errors::BoardError,
    pool::{Gender, Player, PlayerId, PlayerPool},
};

/// Players considered after the fixed one unless the whole pool is requested.
pub const DEFAULT_CANDIDATE_WINDOW: usize = 7;

/// Match category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Category {
    /// Men's singles.
    MS,
    /// Women's singles.
    WS,
    /// Men's doubles.
    MD,
    /// Women's doubles.
    WD,
    /// Mixed doubles.
    XD,
}

impl Category {
    /// Whether the category is played one against one.
    pub fn is_singles(self) -> bool {
        matches!(self, Category::MS | Category::WS)
    }

    /// Players on court for this category.
    pub fn required_players(self) -> usize {
        if self.is_singles() { 2 } else { 4 }
    }

    /// Gender every player must have, `None` for mixed.
    pub fn gender(self) -> Option<Gender> {
        match self {
            Category::MS | Category::MD => Some(Gender::Male),
            Category::WS | Category::WD => Some(Gender::Female),
            Category::XD => None,
        }
    }

    /// Category of a line-up, judged from occupants only.
    ///
    /// Two players mixed are reported as `XD` as well, matching how results are filed.
    pub fn infer<'a>(players: impl IntoIterator<Item = &'a Player>) -> Option<Self> {
        let genders: Vec<Gender> = players.into_iter().map(|p| p.gender).collect();
        let males = genders.iter().filter(|g| **g == Gender::Male).count();
        let females = genders.len() - males;
        match (genders.len(), males, females) {
            (2, 2, 0) => Some(Category::MS),
            (2, 0, 2) => Some(Category::WS),
            (4, 4, 0) => Some(Category::MD),
            (4, 0, 4) => Some(Category::WD),
            (2 | 4, _, _) => Some(Category::XD),
            _ => None,
        }
    }

    /// Whether a concrete line-up satisfies the category's gender mix.
    pub fn accepts(self, players: &[&Player]) -> bool {
        if players.len() != self.required_players() {
            return false;
        }
        match self.gender() {
            Some(gender) => players.iter().all(|p| p.gender == gender),
            None => {
                let males = players.iter().filter(|p| p.gender == Gender::Male).count();
                males * 2 == players.len()
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::MS => "MS",
            Category::WS => "WS",
            Category::MD => "MD",
            Category::WD => "WD",
            Category::XD => "XD",
        };
        f.write_str(label)
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MS" => Ok(Category::MS),
            "WS" => Ok(Category::WS),
            "MD" => Ok(Category::MD),
            "WD" => Ok(Category::WD),
            "XD" | "MX" => Ok(Category::XD),
            other => Err(format!("unknown category `{other}`")),
        }
    }
}

/// Where a player sits: the waiting pool or a court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The waiting pool.
    Pool,
    /// A court by number.
    Court(CourtNo),
}

/// A single move of one player, produced by any input mechanism (drag, tap, assignment).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    /// Player being moved.
    pub player_id: PlayerId,
    /// Where the player is expected to be.
    pub source: Container,
    /// Pool position or slot index the caller saw the player at.
    pub source_index: usize,
    /// Where the player goes.
    pub target: Container,
    /// Slot index on a court; for the pool, `None` appends.
    pub target_index: Option<usize>,
}

/// Identifier of a pending assignment preview.
pub type PlanId = Uuid;

/// Line-up proposal for a free court.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineUp {
    /// Ranking label, set for smart options.
    pub label: Option<String>,
    /// Proposed occupants, slot by slot.
    pub slots: [Option<Player>; SLOTS_PER_COURT],
}

impl LineUp {
    /// Occupants in slot order.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.iter().flatten()
    }
}

/// How a preview was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanKind {
    /// Random draw around the first player of the pool.
    Auto {
        /// Player every draw is built around.
        fixed: PlayerId,
        /// Draw from the whole pool instead of the candidate window.
        full_pool: bool,
        /// Shown when the fixed player does not fit the category.
        warning: Option<String>,
    },
    /// Groupings ranked by the suggestion collaborator.
    Smart,
}

/// Preview awaiting confirm, redo or cancel. Nothing on the board changes until confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPlan {
    /// Identifier callers must echo back.
    pub id: PlanId,
    /// Court the preview targets.
    pub court_no: CourtNo,
    /// Requested category.
    pub category: Category,
    /// How the preview was produced.
    pub kind: PlanKind,
    /// Options to choose from; auto plans carry one.
    pub options: Vec<LineUp>,
}

/// Grouping returned by the suggestion collaborator, opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedGrouping {
    /// Ranking label.
    pub label: String,
    /// Player ids, team A first.
    pub player_ids: Vec<PlayerId>,
}

/// Result of an auto draw before it is wrapped into a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoDraw {
    /// First player of the pool.
    pub fixed: PlayerId,
    /// Drawn line-up.
    pub line_up: LineUp,
    /// Set when the fixed player does not fit the category.
    pub warning: Option<String>,
}

/// Draw a line-up for `category` around the first player of the pool.
pub fn draw_auto<R: Rng + ?Sized>(
    pool: &PlayerPool,
    category: Category,
    window: Option<usize>,
    rng: &mut R,
) -> Result<AutoDraw, BoardError> {
    let insufficient = BoardError::InsufficientPlayers { category };
    let fixed = pool.first().ok_or(insufficient.clone())?;
    let window = window.unwrap_or(usize::MAX);
    let candidates: Vec<&Player> = pool.iter().skip(1).take(window).collect();

    let warning = category
        .gender()
        .filter(|gender| *gender != fixed.gender)
        .map(|gender| {
            format!(
                "{} is {} but {} is a {} category",
                fixed.display_name,
                fixed.gender,
                category,
                gender.to_string().to_lowercase()
            )
        });

    let chosen: Vec<&Player> = match category.gender() {
        Some(gender) => {
            let mut eligible: Vec<&Player> =
                candidates.into_iter().filter(|p| p.gender == gender).collect();
            let needed = category.required_players() - 1;
            if eligible.len() < needed {
                return Err(insufficient);
            }
            eligible.shuffle(rng);
            eligible.truncate(needed);
            eligible
        }
        None => {
            let (mut same, mut opposite): (Vec<&Player>, Vec<&Player>) =
                candidates.into_iter().partition(|p| p.gender == fixed.gender);
            if opposite.len() < 2 || same.is_empty() {
                return Err(insufficient);
            }
            same.shuffle(rng);
            opposite.shuffle(rng);
            // partner (opposite), opponent of the fixed gender, opponent of the partner's gender
            vec![opposite[0], same[0], opposite[1]]
        }
    };

    let mut line_up: Vec<Player> = Vec::with_capacity(category.required_players());
    line_up.push(fixed.clone());
    line_up.extend(chosen.into_iter().cloned());

    Ok(AutoDraw {
        fixed: fixed.id.clone(),
        line_up: place(category, None, line_up),
        warning,
    })
}

/// Lay out players on the four slots: doubles in order, singles on the diagonal (0 and 3).
pub fn place(category: Category, label: Option<String>, players: Vec<Player>) -> LineUp {
    let mut slots: [Option<Player>; SLOTS_PER_COURT] = Default::default();
    if category.is_singles() {
        let mut players = players.into_iter();
        slots[0] = players.next();
        slots[3] = players.next();
    } else {
        for (slot, player) in slots.iter_mut().zip(players) {
            *slot = Some(player);
        }
    }
    LineUp { label, slots }
}

/// Keep the groupings that can be played from the current pool, in the collaborator's order.
pub fn usable_groupings(
    pool: &PlayerPool,
    category: Category,
    groupings: Vec<SuggestedGrouping>,
) -> Vec<LineUp> {
    groupings
        .into_iter()
        .filter_map(|grouping| {
            let players: Option<Vec<&Player>> = grouping
                .player_ids
                .iter()
                .map(|id| pool.position(id).and_then(|index| pool.get(index)))
                .collect();
            let players = players?;
            let mut unique: Vec<&PlayerId> = grouping.player_ids.iter().collect();
            unique.sort();
            unique.dedup();
            if unique.len() != players.len() || players.len() != category.required_players() {
                return None;
            }
            let players = players.into_iter().cloned().collect();
            Some(place(category, Some(grouping.label), players))
        })
        .collect()
}
