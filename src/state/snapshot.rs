//! Conversions between board state and the snapshot entities kept in the store.

use thiserror::Error;

use crate::{
    dao::models::{
        CourtSnapshotEntity, NotifiedSnapshotEntity, OccupantEntity, PoolSnapshotEntity,
        RawSnapshot,
    },
    state::{
        assignment::Category,
        clock::MatchClock,
        court::{Court, SLOTS_PER_COURT},
        pool::{Gender, Player, PlayerId},
    },
};

/// Reasons a stored snapshot cannot be turned back into board state.
#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    /// Not the expected JSON shape.
    #[error("malformed snapshot document")]
    Malformed(#[from] serde_json::Error),
    /// A player's gender is neither male nor female.
    #[error("unknown gender `{gender}` for player `{player_id}`")]
    UnknownGender {
        /// Player carrying the value.
        player_id: String,
        /// Stored gender text.
        gender: String,
    },
    /// Court number zero.
    #[error("court number must be positive")]
    InvalidCourtNo,
    /// More than four slots.
    #[error("court snapshot holds {0} slots")]
    TooManySlots(usize),
    /// Category code not recognised.
    #[error("unknown category: {0}")]
    UnknownCategory(String),
}

impl From<&Player> for OccupantEntity {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            display_name: player.display_name.clone(),
            gender: player.gender.to_string(),
            avatar_ref: player.avatar_ref.clone(),
            is_guest: player.is_guest,
        }
    }
}

impl TryFrom<OccupantEntity> for Player {
    type Error = SnapshotDecodeError;

    fn try_from(entity: OccupantEntity) -> Result<Self, Self::Error> {
        let gender =
            Gender::parse(&entity.gender).ok_or_else(|| SnapshotDecodeError::UnknownGender {
                player_id: entity.id.clone(),
                gender: entity.gender.clone(),
            })?;
        Ok(Player {
            id: entity.id,
            display_name: entity.display_name,
            gender,
            avatar_ref: entity.avatar_ref,
            is_guest: entity.is_guest,
        })
    }
}

/// Court rebuilt from a snapshot together with its persisted running flag.
#[derive(Debug, Clone)]
pub struct RestoredCourt {
    /// Rebuilt court, clock stopped.
    pub court: Court,
    /// Whether the snapshot said the clock was running.
    pub was_running: bool,
}

/// Snapshot entity of a court.
pub fn court_to_entity(court: &Court, club_id: &str, date: &str) -> CourtSnapshotEntity {
    CourtSnapshotEntity {
        club_id: club_id.to_string(),
        date: date.to_string(),
        court_no: court.court_no(),
        assigned: court
            .slots()
            .iter()
            .map(|slot| slot.as_ref().map(OccupantEntity::from))
            .collect(),
        is_running: court.clock().is_running(),
        started_at: court.clock().started_at_ms(),
        last_elapsed_ms: court.clock().elapsed_ms(),
        score: court.score().to_string(),
        category: court.category().map(|c| c.to_string()),
    }
}

/// Decode one court document.
pub fn decode_court(raw: RawSnapshot) -> Result<RestoredCourt, SnapshotDecodeError> {
    let entity: CourtSnapshotEntity = serde_json::from_value(raw.value)?;
    if entity.court_no == 0 {
        return Err(SnapshotDecodeError::InvalidCourtNo);
    }
    if entity.assigned.len() > SLOTS_PER_COURT {
        return Err(SnapshotDecodeError::TooManySlots(entity.assigned.len()));
    }
    let category = entity
        .category
        .map(|raw| raw.parse::<Category>().map_err(SnapshotDecodeError::UnknownCategory))
        .transpose()?;

    let mut court = Court::new(entity.court_no);
    for (slot, occupant) in entity.assigned.into_iter().enumerate() {
        if let Some(occupant) = occupant {
            // slot is bounded by the length check above
            let _ = court.put(slot, Player::try_from(occupant)?);
        }
    }
    court.clock = MatchClock::with_elapsed(entity.last_elapsed_ms);
    court.score = entity.score;
    court.category = category;

    Ok(RestoredCourt {
        court,
        was_running: entity.is_running,
    })
}

/// Snapshot entity of the pool.
pub fn pool_to_entity<'a>(
    players: impl Iterator<Item = &'a Player>,
    club_id: &str,
    date: &str,
) -> PoolSnapshotEntity {
    PoolSnapshotEntity {
        club_id: club_id.to_string(),
        date: date.to_string(),
        players: players.map(OccupantEntity::from).collect(),
    }
}

/// Decode the pool document.
pub fn decode_pool(raw: RawSnapshot) -> Result<Vec<Player>, SnapshotDecodeError> {
    let entity: PoolSnapshotEntity = serde_json::from_value(raw.value)?;
    entity.players.into_iter().map(Player::try_from).collect()
}

/// Snapshot entity of the reported-present cache.
pub fn notified_to_entity(ids: Vec<PlayerId>, club_id: &str, date: &str) -> NotifiedSnapshotEntity {
    NotifiedSnapshotEntity {
        club_id: club_id.to_string(),
        date: date.to_string(),
        player_ids: ids,
    }
}

/// Decode the reported-present document.
pub fn decode_notified(raw: RawSnapshot) -> Result<Vec<PlayerId>, SnapshotDecodeError> {
    let entity: NotifiedSnapshotEntity = serde_json::from_value(raw.value)?;
    Ok(entity.player_ids)
}
