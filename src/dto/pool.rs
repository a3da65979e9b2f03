//! Request and response bodies of the pool routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        board::{BoardView, PlayerView},
        validation::{validate_court_no, validate_player_id},
    },
    state::{
        assignment::{Container, TransferIntent},
        pool::Gender,
    },
};

/// Add a roster member to the waiting pool.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddPlayerRequest {
    /// Roster id of the member.
    #[validate(custom(function = "validate_player_id"))]
    pub player_id: String,
}

/// Create a guest and append it to the pool.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AddGuestRequest {
    /// Display name; surrounding whitespace is trimmed.
    #[validate(length(max = 64))]
    #[serde(default)]
    pub name: String,
    /// Gender of the guest.
    pub gender: Gender,
}

/// Response to a guest creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuestCreatedResponse {
    /// The created guest.
    pub guest: PlayerView,
    /// Board with the guest appended to the pool.
    pub board: BoardView,
}

/// Move the pool entry at `from` to position `to`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ReorderPoolRequest {
    /// Current pool position.
    pub from: usize,
    /// Destination position, clamped to the pool length.
    pub to: usize,
}

/// Source or target of a transfer.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerDto {
    /// The waiting pool.
    Pool,
    /// A court by number.
    Court {
        /// Court number, starting at 1.
        court_no: u32,
    },
}

impl From<ContainerDto> for Container {
    fn from(value: ContainerDto) -> Self {
        match value {
            ContainerDto::Pool => Container::Pool,
            ContainerDto::Court { court_no } => Container::Court(court_no),
        }
    }
}

/// Move one player between the pool and court slots.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Player being moved.
    pub player_id: String,
    /// Where the player is taken from.
    pub source: ContainerDto,
    /// Pool position or slot index the player is expected at.
    pub source_index: usize,
    /// Where the player goes.
    pub target: ContainerDto,
    /// Target slot on a court or position in the pool.
    /// Omitted means the first empty slot, or the end of the pool.
    #[serde(default)]
    pub target_index: Option<usize>,
}

impl Validate for TransferRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_player_id(&self.player_id) {
            errors.add("player_id", e);
        }
        for (field, container) in [("source", self.source), ("target", self.target)] {
            if let ContainerDto::Court { court_no } = container
                && let Err(e) = validate_court_no(court_no)
            {
                errors.add(field, e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl From<TransferRequest> for TransferIntent {
    fn from(request: TransferRequest) -> Self {
        Self {
            player_id: request.player_id,
            source: request.source.into(),
            source_index: request.source_index,
            target: request.target.into(),
            target_index: request.target_index,
        }
    }
}

/// Roster member with their whereabouts tonight.
#[derive(Debug, Serialize, ToSchema)]
pub struct RosterEntryView {
    /// The roster member.
    #[serde(flatten)]
    pub player: PlayerView,
    /// Already in the pool or on a court.
    pub present: bool,
}
