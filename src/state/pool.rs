//! Ordered waiting queue of players not currently on a court.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::errors::BoardError;

/// Identifier of a roster member or guest.
pub type PlayerId = String;

/// Gender as recorded by the club roster; drives category constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Gender {
    /// Men's side of the draw.
    Male,
    /// Women's side of the draw.
    Female,
}

impl Gender {
    /// Lowercase form used inside guest identifiers.
    pub fn slug(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }

    /// The other gender, used for mixed doubles pairing.
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }

    /// Parse the loose spellings found in roster exports and snapshots.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            _ => None,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
        }
    }
}

/// A participant of the session: roster member or guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Roster id or generated guest id.
    pub id: PlayerId,
    /// Name shown on the board.
    pub display_name: String,
    /// Gender used by category filtering.
    pub gender: Gender,
    /// Avatar reference from the roster.
    pub avatar_ref: Option<String>,
    /// Whether the player was added as a guest.
    pub is_guest: bool,
}

impl Player {
    /// Build a guest player. Guests never carry an avatar.
    pub fn guest(id: PlayerId, display_name: String, gender: Gender) -> Self {
        Self {
            id,
            display_name,
            gender,
            avatar_ref: None,
            is_guest: true,
        }
    }
}

/// Pool of waiting players keyed by id, in queue order.
#[derive(Debug, Clone, Default)]
pub struct PlayerPool {
    players: IndexMap<PlayerId, Player>,
}

impl PlayerPool {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waiting players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Nobody waiting.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Whether `player_id` is waiting.
    pub fn contains(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    /// Queue position of a player, if waiting.
    pub fn position(&self, player_id: &str) -> Option<usize> {
        self.players.get_index_of(player_id)
    }

    /// Player at a queue position.
    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get_index(index).map(|(_, player)| player)
    }

    /// Player at the head of the queue.
    pub fn first(&self) -> Option<&Player> {
        self.get(0)
    }

    /// Waiting players, front first.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Append a player to the back of the queue; returns `false` when already waiting.
    pub fn push_back(&mut self, player: Player) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        self.players.insert(player.id.clone(), player);
        true
    }

    /// Insert a player at `index`, clamped to the queue length.
    ///
    /// Returns `false` when the player is already waiting.
    pub fn insert_at(&mut self, index: usize, player: Player) -> bool {
        if self.contains(&player.id) {
            return false;
        }
        let index = index.min(self.players.len());
        self.players.shift_insert(index, player.id.clone(), player);
        true
    }

    /// Put a player at the head of the queue.
    pub fn push_front(&mut self, player: Player) -> bool {
        self.insert_at(0, player)
    }

    /// Put several players at the head of the queue, keeping their relative order.
    pub fn push_front_all(&mut self, players: impl IntoIterator<Item = Player>) -> bool {
        let mut changed = false;
        let mut at = 0;
        for player in players {
            if self.insert_at(at, player) {
                at += 1;
                changed = true;
            }
        }
        changed
    }

    /// Remove a player while preserving the order of the others.
    pub fn remove(&mut self, player_id: &str) -> Option<Player> {
        self.players.shift_remove(player_id)
    }

    /// Stable move of the entry at `from` to position `to`.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), BoardError> {
        let len = self.players.len();
        for index in [from, to] {
            if index >= len {
                return Err(BoardError::PoolIndexOutOfRange { index, len });
            }
        }
        self.players.move_index(from, to);
        Ok(())
    }

    /// Drop every waiting player.
    pub fn clear(&mut self) {
        self.players.clear();
    }
}

/// Trim and validate a guest display name.
pub fn normalize_guest_name(raw: &str) -> Result<String, BoardError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(BoardError::EmptyGuestName);
    }
    Ok(name.to_string())
}

#[cfg(test)]
pub(crate) fn player(id: &str, gender: Gender) -> Player {
    Player {
        id: id.to_string(),
        display_name: id.to_uppercase(),
        gender,
        avatar_ref: None,
        is_guest: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(pool: &PlayerPool) -> Vec<&str> {
        pool.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn push_back_is_idempotent() {
        let mut pool = PlayerPool::new();
        assert!(pool.push_back(player("ann", Gender::Female)));
        assert!(!pool.push_back(player("ann", Gender::Female)));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut pool = PlayerPool::new();
        pool.push_back(player("ann", Gender::Female));
        assert!(pool.remove("bob").is_none());
        assert_eq!(ids(&pool), vec!["ann"]);
    }

    #[test]
    fn reorder_moves_entry_and_keeps_others_stable() {
        let mut pool = PlayerPool::new();
        for id in ["a", "b", "c", "d"] {
            pool.push_back(player(id, Gender::Male));
        }
        pool.reorder(3, 1).unwrap();
        assert_eq!(ids(&pool), vec!["a", "d", "b", "c"]);
        pool.reorder(0, 3).unwrap();
        assert_eq!(ids(&pool), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn reorder_out_of_range_is_rejected() {
        let mut pool = PlayerPool::new();
        pool.push_back(player("a", Gender::Male));
        assert_eq!(
            pool.reorder(0, 1),
            Err(BoardError::PoolIndexOutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn push_front_all_keeps_relative_order() {
        let mut pool = PlayerPool::new();
        pool.push_back(player("x", Gender::Male));
        pool.push_front_all([player("a", Gender::Male), player("b", Gender::Male)]);
        assert_eq!(ids(&pool), vec!["a", "b", "x"]);
    }

    #[test]
    fn guest_name_is_trimmed() {
        assert_eq!(normalize_guest_name("  Sam ").unwrap(), "Sam");
        assert_eq!(normalize_guest_name("   "), Err(BoardError::EmptyGuestName));
    }

    #[test]
    fn gender_parse_accepts_roster_spellings() {
        assert_eq!(Gender::parse("MALE"), Some(Gender::Male));
        assert_eq!(Gender::parse("f"), Some(Gender::Female));
        assert_eq!(Gender::parse("other"), None);
    }
}
