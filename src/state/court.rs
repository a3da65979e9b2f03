//! Physical courts, their four slots and the registry that numbers them.

use std::collections::BTreeMap;

use crate::state::{
    assignment::Category,
    clock::MatchClock,
    errors::BoardError,
    pool::{Player, PlayerId},
};

/// Court number, unique for the lifetime of a registry.
pub type CourtNo = u32;
/// Slots on a court; team A holds slots 0 and 1, team B slots 2 and 3.
pub const SLOTS_PER_COURT: usize = 4;

/// A court with its occupants, clock and in-progress score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Court {
    court_no: CourtNo,
    slots: [Option<Player>; SLOTS_PER_COURT],
    pub(crate) clock: MatchClock,
    pub(crate) score: String,
    pub(crate) category: Option<Category>,
}

impl Court {
    /// Empty court with a zeroed clock.
    pub fn new(court_no: CourtNo) -> Self {
        Self {
            court_no,
            slots: Default::default(),
            clock: MatchClock::default(),
            score: String::new(),
            category: None,
        }
    }

    /// Number of the court.
    pub fn court_no(&self) -> CourtNo {
        self.court_no
    }

    /// Match clock.
    pub fn clock(&self) -> &MatchClock {
        &self.clock
    }

    /// Live score text.
    pub fn score(&self) -> &str {
        &self.score
    }

    /// Category of the current match.
    pub fn category(&self) -> Option<Category> {
        self.category
    }

    /// All four slots.
    pub fn slots(&self) -> &[Option<Player>; SLOTS_PER_COURT] {
        &self.slots
    }

    /// Occupant of `slot`, rejecting indexes past the last slot.
    pub fn occupant(&self, slot: usize) -> Result<Option<&Player>, BoardError> {
        self.slots
            .get(slot)
            .map(Option::as_ref)
            .ok_or(BoardError::SlotOutOfRange(slot))
    }

    /// Occupied slots in slot order.
    pub fn occupants(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, occupant)| occupant.as_ref().map(|p| (slot, p)))
    }

    /// Number of occupied slots.
    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// No occupant.
    pub fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// Empty with a stopped clock: nothing worth persisting.
    pub fn is_idle(&self) -> bool {
        self.is_empty() && !self.clock.is_running()
    }

    /// Slot holding `player_id`, if any.
    pub fn slot_of(&self, player_id: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|p| p.id == player_id))
    }

    /// Place `player` into `slot`, returning the displaced occupant.
    pub fn put(&mut self, slot: usize, player: Player) -> Result<Option<Player>, BoardError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(BoardError::SlotOutOfRange(slot))?;
        Ok(entry.replace(player))
    }

    /// Empty `slot`, returning its occupant.
    pub fn take(&mut self, slot: usize) -> Result<Option<Player>, BoardError> {
        let entry = self
            .slots
            .get_mut(slot)
            .ok_or(BoardError::SlotOutOfRange(slot))?;
        Ok(entry.take())
    }

    /// Exchange two slots.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), BoardError> {
        for slot in [a, b] {
            if slot >= SLOTS_PER_COURT {
                return Err(BoardError::SlotOutOfRange(slot));
            }
        }
        self.slots.swap(a, b);
        Ok(())
    }

    /// Team A occupants (slots 0 and 1).
    pub fn team_a(&self) -> Vec<Player> {
        self.slots[..2].iter().flatten().cloned().collect()
    }

    /// Team B occupants (slots 2 and 3).
    pub fn team_b(&self) -> Vec<Player> {
        self.slots[2..].iter().flatten().cloned().collect()
    }

    /// Empty the court: occupants out, clock zeroed, score and category cleared.
    pub fn clear(&mut self) -> Vec<Player> {
        self.clock.reset();
        self.score.clear();
        self.category = None;
        self.slots.iter_mut().filter_map(Option::take).collect()
    }

    /// Ids of the occupants.
    pub fn player_ids(&self) -> impl Iterator<Item = &PlayerId> {
        self.occupants().map(|(_, p)| &p.id)
    }
}

/// Courts keyed by number, with a high-water mark so numbers are never reused.
#[derive(Debug, Clone, Default)]
pub struct CourtRegistry {
    courts: BTreeMap<CourtNo, Court>,
    high_water: CourtNo,
}

impl CourtRegistry {
    /// Registry without courts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty court numbered one past the highest number ever used.
    pub fn create(&mut self) -> CourtNo {
        self.high_water += 1;
        let court_no = self.high_water;
        self.courts.insert(court_no, Court::new(court_no));
        court_no
    }

    /// Insert a court rebuilt from a snapshot.
    pub fn insert_restored(&mut self, court: Court) {
        self.high_water = self.high_water.max(court.court_no());
        self.courts.insert(court.court_no(), court);
    }

    /// Take a court out of the registry; its number is not reused.
    pub fn remove(&mut self, court_no: CourtNo) -> Result<Court, BoardError> {
        self.courts
            .remove(&court_no)
            .ok_or(BoardError::CourtNotFound(court_no))
    }

    /// Court by number.
    pub fn get(&self, court_no: CourtNo) -> Result<&Court, BoardError> {
        self.courts
            .get(&court_no)
            .ok_or(BoardError::CourtNotFound(court_no))
    }

    /// Court by number, mutably.
    pub fn get_mut(&mut self, court_no: CourtNo) -> Result<&mut Court, BoardError> {
        self.courts
            .get_mut(&court_no)
            .ok_or(BoardError::CourtNotFound(court_no))
    }

    /// Courts ordered by number.
    pub fn iter(&self) -> impl Iterator<Item = &Court> {
        self.courts.values()
    }

    /// Court numbers in ascending order.
    pub fn numbers(&self) -> Vec<CourtNo> {
        self.courts.keys().copied().collect()
    }

    /// Number of courts.
    pub fn len(&self) -> usize {
        self.courts.len()
    }

    /// No court at all.
    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
    }

    /// Lowest-numbered idle court: four empty slots and a stopped clock.
    pub fn free_court(&self) -> Option<CourtNo> {
        self.courts
            .values()
            .find(|court| court.is_idle())
            .map(Court::court_no)
    }

    /// Court and slot currently holding `player_id`.
    pub fn locate(&self, player_id: &str) -> Option<(CourtNo, usize)> {
        self.courts
            .values()
            .find_map(|court| court.slot_of(player_id).map(|slot| (court.court_no(), slot)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::pool::{Gender, player};

    #[test]
    fn numbers_are_never_reused() {
        let mut registry = CourtRegistry::new();
        assert_eq!(registry.create(), 1);
        assert_eq!(registry.create(), 2);
        registry.remove(2).unwrap();
        assert_eq!(registry.create(), 3);
    }

    #[test]
    fn restored_courts_raise_the_high_water_mark() {
        let mut registry = CourtRegistry::new();
        registry.insert_restored(Court::new(7));
        assert_eq!(registry.create(), 8);
    }

    #[test]
    fn remove_unknown_court() {
        let mut registry = CourtRegistry::new();
        assert_eq!(registry.remove(4), Err(BoardError::CourtNotFound(4)));
    }

    #[test]
    fn free_court_skips_partially_filled_courts() {
        let mut registry = CourtRegistry::new();
        let first = registry.create();
        let second = registry.create();
        registry
            .get_mut(first)
            .unwrap()
            .put(2, player("a", Gender::Male))
            .unwrap();
        assert_eq!(registry.free_court(), Some(second));
    }

    #[test]
    fn free_court_skips_empty_courts_with_a_running_clock() {
        let mut registry = CourtRegistry::new();
        let first = registry.create();
        let second = registry.create();
        let court = registry.get_mut(first).unwrap();
        court.put(0, player("a", Gender::Male)).unwrap();
        court.clock.start(first, 0).unwrap();
        court.take(0).unwrap();
        assert!(court.is_empty());
        assert_eq!(registry.free_court(), Some(second));
    }

    #[test]
    fn put_returns_displaced_occupant() {
        let mut court = Court::new(1);
        court.put(0, player("a", Gender::Male)).unwrap();
        let displaced = court.put(0, player("b", Gender::Male)).unwrap();
        assert_eq!(displaced.map(|p| p.id), Some("a".to_string()));
        assert!(matches!(
            court.put(4, player("c", Gender::Male)),
            Err(BoardError::SlotOutOfRange(4))
        ));
    }

    #[test]
    fn teams_follow_slot_layout() {
        let mut court = Court::new(1);
        court.put(0, player("a", Gender::Male)).unwrap();
        court.put(3, player("d", Gender::Male)).unwrap();
        assert_eq!(court.team_a().len(), 1);
        assert_eq!(court.team_b()[0].id, "d");
    }
}
