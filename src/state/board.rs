//! The peg board: courts, pool, pending preview and session context behind one lock.
//!
//! Every mutation either fails without touching anything or succeeds and reports a
//! [`ChangeSet`] describing what must be mirrored to the session store, which clock
//! tasks to start or cancel, and whether screens need a fresh board view.

use std::collections::{BTreeSet, HashSet};

use rand::Rng;
use time::Date;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::{CourtKey, CourtSnapshotEntity, NotifiedSnapshotEntity, PoolSnapshotEntity},
    state::{
        assignment::{
            self, AssignmentPlan, Category, Container, LineUp, PlanId, PlanKind,
            SuggestedGrouping, TransferIntent,
        },
        court::{CourtNo, CourtRegistry, SLOTS_PER_COURT},
        errors::BoardError,
        pool::{Gender, Player, PlayerId, PlayerPool, normalize_guest_name},
        score::{FinalScore, MatchResult, Team},
        session::SessionContext,
        snapshot::{self, RestoredCourt},
    },
};

/// Side effects of an accepted mutation.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    /// Courts whose snapshot must be rewritten (or deleted when idle).
    pub courts: BTreeSet<CourtNo>,
    /// Courts that no longer exist.
    pub removed_courts: BTreeSet<CourtNo>,
    /// Pool snapshot must be rewritten.
    pub pool: bool,
    /// Reported-present cache must be rewritten.
    pub notified: bool,
    /// The pending preview changed.
    pub preview: bool,
    /// Clock tasks to spawn, with the generation they must carry.
    pub started_clocks: Vec<(CourtNo, u64)>,
    /// Clock tasks to cancel.
    pub stopped_clocks: BTreeSet<CourtNo>,
}

impl ChangeSet {
    /// Changes touching one court.
    pub fn court(court_no: CourtNo) -> Self {
        Self::default().with_court(court_no)
    }

    /// Changes touching the pool.
    pub fn pool() -> Self {
        Self {
            pool: true,
            ..Self::default()
        }
    }

    /// Changes touching the preview only.
    pub fn preview() -> Self {
        Self {
            preview: true,
            ..Self::default()
        }
    }

    /// Add a court to rewrite.
    pub fn with_court(mut self, court_no: CourtNo) -> Self {
        self.courts.insert(court_no);
        self
    }

    /// Mark the pool dirty when `changed`.
    pub fn with_pool(mut self, changed: bool) -> Self {
        self.pool |= changed;
        self
    }

    /// Nothing to persist, spawn or broadcast.
    pub fn is_empty(&self) -> bool {
        self.courts.is_empty()
            && self.removed_courts.is_empty()
            && !self.pool
            && !self.notified
            && !self.preview
            && self.started_clocks.is_empty()
            && self.stopped_clocks.is_empty()
    }
}

/// Everything decoded from the store for one session.
#[derive(Debug, Clone, Default)]
pub struct RestoredSession {
    /// Decoded courts.
    pub courts: Vec<RestoredCourt>,
    /// Decoded pool, front first.
    pub pool: Vec<Player>,
    /// Ids already reported present.
    pub notified: Vec<PlayerId>,
}

/// Summary of a restore, for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// Courts restored.
    pub courts: usize,
    /// Restored courts whose clock resumes.
    pub running: usize,
    /// Players restored into the pool.
    pub pool: usize,
    /// Players dropped because they appeared twice.
    pub dropped_duplicates: usize,
    /// Side effects of the restore.
    pub changes: ChangeSet,
}

/// Courts, pool and pending preview of one club night.
#[derive(Debug, Clone)]
pub struct Board {
    session: SessionContext,
    courts: CourtRegistry,
    pool: PlayerPool,
    preview: Option<AssignmentPlan>,
    candidate_window: usize,
}

impl Board {
    /// Board with a single empty court.
    pub fn new(club_id: impl Into<String>, date: Date, candidate_window: usize) -> Self {
        let mut courts = CourtRegistry::new();
        courts.create();
        Self {
            session: SessionContext::new(club_id, date),
            courts,
            pool: PlayerPool::new(),
            preview: None,
            candidate_window,
        }
    }

    /// Club, date and guest numbering.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Courts by number.
    pub fn courts(&self) -> &CourtRegistry {
        &self.courts
    }

    /// Waiting queue.
    pub fn pool(&self) -> &PlayerPool {
        &self.pool
    }

    /// Pending preview, if any.
    pub fn preview(&self) -> Option<&AssignmentPlan> {
        self.preview.as_ref()
    }

    /// No player anywhere, no running clock and at most one court: nothing to lose by restoring.
    pub fn is_blank(&self) -> bool {
        self.pool.is_empty()
            && self.courts.len() <= 1
            && self.courts.iter().all(|court| court.is_idle())
    }

    /// Whether `player_id` is waiting or playing.
    pub fn is_present(&self, player_id: &str) -> bool {
        self.pool.contains(player_id) || self.courts.locate(player_id).is_some()
    }

    /// Open a new court after the highest number used so far.
    pub fn create_court(&mut self) -> (CourtNo, ChangeSet) {
        let court_no = self.courts.create();
        (court_no, ChangeSet::court(court_no))
    }

    /// Remove a court; its occupants go back to the head of the pool.
    pub fn remove_court(&mut self, court_no: CourtNo) -> Result<ChangeSet, BoardError> {
        let mut court = self.courts.remove(court_no)?;
        let returned = self.pool.push_front_all(court.clear());

        let mut changes = ChangeSet::default().with_pool(returned);
        changes.removed_courts.insert(court_no);
        changes.stopped_clocks.insert(court_no);
        if self.preview.as_ref().is_some_and(|plan| plan.court_no == court_no) {
            self.preview = None;
            changes.preview = true;
        }
        Ok(changes)
    }

    /// Append a player to the pool; a no-op when already waiting or playing.
    pub fn add_player(&mut self, player: Player) -> ChangeSet {
        if self.is_present(&player.id) {
            return ChangeSet::default();
        }
        self.session.observe_player_id(&player.id);
        ChangeSet::default().with_pool(self.pool.push_back(player))
    }

    /// Create a guest and append it to the pool.
    pub fn add_guest(
        &mut self,
        gender: Gender,
        name: &str,
    ) -> Result<(Player, ChangeSet), BoardError> {
        let name = normalize_guest_name(name)?;
        let id = self.session.next_guest_id(gender);
        let guest = Player::guest(id, name, gender);
        self.pool.push_back(guest.clone());
        Ok((guest, ChangeSet::pool()))
    }

    /// Drop a player from the pool; absent players are ignored.
    pub fn remove_from_pool(&mut self, player_id: &str) -> ChangeSet {
        ChangeSet::default().with_pool(self.pool.remove(player_id).is_some())
    }

    /// Move a waiting player to another position.
    pub fn reorder_pool(&mut self, from: usize, to: usize) -> Result<ChangeSet, BoardError> {
        self.pool.reorder(from, to)?;
        Ok(ChangeSet::default().with_pool(from != to))
    }

    /// Apply one transfer intent after checking it still describes the board.
    pub fn transfer(&mut self, intent: TransferIntent) -> Result<ChangeSet, BoardError> {
        let TransferIntent {
            player_id,
            source,
            source_index,
            target,
            target_index,
        } = intent;

        if !self.is_present(&player_id) {
            return Err(BoardError::PlayerNotFound(player_id));
        }
        let at_source = match source {
            Container::Pool => self.pool.position(&player_id) == Some(source_index),
            Container::Court(court_no) => self
                .courts
                .get(court_no)?
                .occupant(source_index)?
                .is_some_and(|p| p.id == player_id),
        };
        if !at_source {
            return Err(BoardError::StaleTransfer(player_id));
        }

        match (source, target) {
            (Container::Pool, Container::Pool) => {
                let to = target_index.unwrap_or(self.pool.len() - 1);
                self.reorder_pool(source_index, to)
            }
            (Container::Pool, Container::Court(court_no)) => {
                let slot = self.target_slot(court_no, target_index)?;
                let Some(player) = self.pool.remove(&player_id) else {
                    return Err(BoardError::StaleTransfer(player_id));
                };
                let displaced = self.courts.get_mut(court_no)?.put(slot, player)?;
                if let Some(displaced) = displaced {
                    self.pool.push_front(displaced);
                }
                Ok(ChangeSet::court(court_no).with_pool(true))
            }
            (Container::Court(court_no), Container::Pool) => {
                if let Some(index) = target_index
                    && index > self.pool.len()
                {
                    return Err(BoardError::PoolIndexOutOfRange {
                        index,
                        len: self.pool.len(),
                    });
                }
                let Some(player) = self.courts.get_mut(court_no)?.take(source_index)? else {
                    return Err(BoardError::StaleTransfer(player_id));
                };
                let at = target_index.unwrap_or(self.pool.len());
                self.pool.insert_at(at, player);
                Ok(ChangeSet::court(court_no).with_pool(true))
            }
            (Container::Court(from), Container::Court(to)) if from == to => {
                let slot = target_index.ok_or(BoardError::SlotOutOfRange(SLOTS_PER_COURT))?;
                self.courts.get_mut(from)?.swap(source_index, slot)?;
                Ok(ChangeSet::court(from))
            }
            (Container::Court(from), Container::Court(to)) => {
                let slot = self.target_slot(to, target_index)?;
                let Some(player) = self.courts.get_mut(from)?.take(source_index)? else {
                    return Err(BoardError::StaleTransfer(player_id));
                };
                let displaced = self.courts.get_mut(to)?.put(slot, player)?;
                let returned = match displaced {
                    Some(displaced) => self.pool.push_front(displaced),
                    None => false,
                };
                Ok(ChangeSet::court(from).with_court(to).with_pool(returned))
            }
        }
    }

    /// Resolve the destination slot on a court: explicit index, or the first empty slot.
    fn target_slot(
        &self,
        court_no: CourtNo,
        requested: Option<usize>,
    ) -> Result<usize, BoardError> {
        let court = self.courts.get(court_no)?;
        match requested {
            Some(slot) => court.occupant(slot).map(|_| slot),
            None => court
                .slots()
                .iter()
                .position(Option::is_none)
                .ok_or(BoardError::SlotOutOfRange(SLOTS_PER_COURT)),
        }
    }

    /// Store the in-progress score text shown on a court.
    pub fn set_score(&mut self, court_no: CourtNo, score: &str) -> Result<ChangeSet, BoardError> {
        let court = self.courts.get_mut(court_no)?;
        if court.score == score {
            return Ok(ChangeSet::default());
        }
        court.score = score.to_string();
        Ok(ChangeSet::court(court_no))
    }

    /// Start or resume the clock of an occupied court.
    pub fn start_clock(&mut self, court_no: CourtNo, now_ms: u64) -> Result<ChangeSet, BoardError> {
        let court = self.courts.get_mut(court_no)?;
        if court.is_empty() {
            return Err(BoardError::CourtEmpty(court_no));
        }
        let generation = court.clock.start(court_no, now_ms)?;
        let mut changes = ChangeSet::court(court_no);
        changes.started_clocks.push((court_no, generation));
        Ok(changes)
    }

    /// Halt a running clock.
    pub fn stop_clock(&mut self, court_no: CourtNo) -> Result<ChangeSet, BoardError> {
        self.courts.get_mut(court_no)?.clock.stop(court_no)?;
        let mut changes = ChangeSet::court(court_no);
        changes.stopped_clocks.insert(court_no);
        Ok(changes)
    }

    /// Apply a clock tick; `None` when the court is gone or the tick is stale.
    pub fn tick(&mut self, court_no: CourtNo, generation: u64) -> Option<u64> {
        let court = self.courts.get_mut(court_no).ok()?;
        court
            .clock
            .tick(generation)
            .then(|| court.clock.elapsed_ms())
    }

    /// Validate a final score, then clear the court and return its players, winners first.
    pub fn finish_match(
        &mut self,
        court_no: CourtNo,
        team_a: &str,
        team_b: &str,
    ) -> Result<(MatchResult, ChangeSet), BoardError> {
        let court = self.courts.get(court_no)?;
        if court.is_empty() {
            return Err(BoardError::CourtEmpty(court_no));
        }
        let score = FinalScore::parse(team_a, team_b)?;

        let category = court
            .category()
            .or_else(|| Category::infer(court.occupants().map(|(_, p)| p)));
        let result = MatchResult {
            court_no,
            category,
            team_a: court.team_a(),
            team_b: court.team_b(),
            score,
            duration_seconds: court.clock().elapsed_ms() / 1_000,
        };

        let court = self.courts.get_mut(court_no)?;
        court.clear();
        let (winners, losers) = match result.winner() {
            Team::A => (&result.team_a, &result.team_b),
            Team::B => (&result.team_b, &result.team_a),
        };
        self.pool
            .push_front_all(winners.iter().chain(losers.iter()).cloned());

        Ok((result, self.cleared(court_no)))
    }

    /// Stop a match without a result; players return to the head of the pool.
    pub fn abandon(&mut self, court_no: CourtNo) -> Result<ChangeSet, BoardError> {
        let court = self.courts.get_mut(court_no)?;
        if court.is_empty() && !court.clock().is_running() {
            return Err(BoardError::CourtEmpty(court_no));
        }
        let players = court.clear();
        self.pool.push_front_all(players);
        Ok(self.cleared(court_no))
    }

    fn cleared(&self, court_no: CourtNo) -> ChangeSet {
        let mut changes = ChangeSet::court(court_no).with_pool(true);
        changes.stopped_clocks.insert(court_no);
        changes
    }

    /// Draw an auto-assignment preview for the first free court.
    pub fn plan_auto<R: Rng + ?Sized>(
        &mut self,
        category: Category,
        full_pool: bool,
        rng: &mut R,
    ) -> Result<(AssignmentPlan, ChangeSet), BoardError> {
        let court_no = self.courts.free_court().ok_or(BoardError::NoFreeCourt)?;
        let window = (!full_pool).then_some(self.candidate_window);
        let draw = assignment::draw_auto(&self.pool, category, window, rng)?;
        let plan = AssignmentPlan {
            id: Uuid::new_v4(),
            court_no,
            category,
            kind: PlanKind::Auto {
                fixed: draw.fixed,
                full_pool,
                warning: draw.warning,
            },
            options: vec![draw.line_up],
        };
        self.preview = Some(plan.clone());
        Ok((plan, ChangeSet::preview()))
    }

    /// Re-shuffle the pending auto preview into a new one.
    pub fn redo_auto<R: Rng + ?Sized>(
        &mut self,
        plan_id: PlanId,
        rng: &mut R,
    ) -> Result<(AssignmentPlan, ChangeSet), BoardError> {
        let plan = self.pending(plan_id)?;
        let PlanKind::Auto { full_pool, .. } = plan.kind else {
            return Err(BoardError::PreviewMismatch);
        };
        let category = plan.category;
        self.plan_auto(category, full_pool, rng)
    }

    /// Court a smart assignment would target.
    pub fn smart_target(&self) -> Result<CourtNo, BoardError> {
        self.courts.free_court().ok_or(BoardError::NoFreeCourt)
    }

    /// Turn collaborator groupings into a smart preview, dropping unplayable ones.
    pub fn plan_smart(
        &mut self,
        category: Category,
        groupings: Vec<SuggestedGrouping>,
    ) -> Result<(AssignmentPlan, ChangeSet), BoardError> {
        let court_no = self.smart_target()?;
        let options = assignment::usable_groupings(&self.pool, category, groupings);
        if options.is_empty() {
            return Err(BoardError::NoSuggestions { category });
        }
        let plan = AssignmentPlan {
            id: Uuid::new_v4(),
            court_no,
            category,
            kind: PlanKind::Smart,
            options,
        };
        self.preview = Some(plan.clone());
        Ok((plan, ChangeSet::preview()))
    }

    /// Perform the transfers of a preview option.
    pub fn confirm_plan(
        &mut self,
        plan_id: PlanId,
        option: usize,
        start_clock: bool,
        now_ms: u64,
    ) -> Result<(CourtNo, ChangeSet), BoardError> {
        let plan = self.pending(plan_id)?;
        let line_up: &LineUp = plan.options.get(option).ok_or(BoardError::PreviewMismatch)?;
        let court_no = plan.court_no;

        match self.courts.get(court_no) {
            Ok(court) if court.is_idle() => {}
            Ok(_) => return Err(BoardError::PreviewStale(format!("court {court_no} is in use"))),
            Err(_) => return Err(BoardError::PreviewStale(format!("court {court_no} was removed"))),
        }
        if let Some(missing) = line_up.players().find(|p| !self.pool.contains(&p.id)) {
            return Err(BoardError::PreviewStale(format!(
                "{} is no longer waiting",
                missing.display_name
            )));
        }

        let slots = line_up.slots.clone();
        let category = plan.category;
        let court = self.courts.get_mut(court_no)?;
        // A new match starts from zero even if the idle court kept a stopped clock.
        court.clear();
        for (slot, player) in slots.into_iter().enumerate() {
            if let Some(player) = player {
                court.put(slot, player)?;
            }
        }
        court.category = Some(category);
        for (_, player) in court.occupants() {
            self.pool.remove(&player.id);
        }
        self.preview = None;

        let mut changes = ChangeSet::court(court_no).with_pool(true);
        changes.preview = true;
        if start_clock {
            let generation = court.clock.start(court_no, now_ms)?;
            changes.started_clocks.push((court_no, generation));
        }
        Ok((court_no, changes))
    }

    /// Discard the pending preview.
    pub fn cancel_plan(&mut self, plan_id: PlanId) -> Result<ChangeSet, BoardError> {
        self.pending(plan_id)?;
        self.preview = None;
        Ok(ChangeSet::preview())
    }

    fn pending(&self, plan_id: PlanId) -> Result<&AssignmentPlan, BoardError> {
        match &self.preview {
            None => Err(BoardError::NoPendingPreview),
            Some(plan) if plan.id != plan_id => Err(BoardError::PreviewMismatch),
            Some(plan) => Ok(plan),
        }
    }

    /// Record a roster player as reported present; `false` when already known.
    pub fn mark_notified(&mut self, player_id: &str) -> bool {
        self.session.mark_notified(player_id)
    }

    /// Whether `player_id` was already reported present today.
    pub fn is_notified(&self, player_id: &str) -> bool {
        self.session.is_notified(player_id)
    }

    /// Merge ids already reported present elsewhere into the notified cache.
    pub fn seed_notified(&mut self, ids: Vec<PlayerId>) -> ChangeSet {
        ChangeSet {
            notified: self.session.seed_notified(ids),
            ..ChangeSet::default()
        }
    }

    /// Move the session to a new day: pool and notified cache reset, live courts re-mirrored.
    pub fn roll_over(&mut self, date: Date) -> ChangeSet {
        if !self.session.roll_over(date) {
            return ChangeSet::default();
        }
        self.pool.clear();
        self.preview = None;
        ChangeSet {
            courts: self.courts.numbers().into_iter().collect(),
            pool: true,
            notified: true,
            preview: true,
            ..ChangeSet::default()
        }
    }

    /// Replace the board with the session decoded from the store.
    pub fn restore(&mut self, restored: RestoredSession, now_ms: u64) -> RestoreReport {
        let RestoredSession {
            mut courts,
            pool,
            notified,
        } = restored;
        let mut report = RestoreReport::default();
        let mut seen: HashSet<PlayerId> = HashSet::new();

        self.courts = CourtRegistry::new();
        self.pool.clear();
        self.preview = None;

        courts.sort_by_key(|entry| entry.court.court_no());
        courts.dedup_by_key(|entry| entry.court.court_no());
        for RestoredCourt {
            mut court,
            was_running,
        } in courts
        {
            let court_no = court.court_no();
            for slot in 0..SLOTS_PER_COURT {
                let Ok(Some(player)) = court.occupant(slot) else {
                    continue;
                };
                if seen.insert(player.id.clone()) {
                    self.session.observe_player_id(&player.id);
                } else {
                    warn!(
                        court_no,
                        player_id = %player.id,
                        "dropping duplicate occupant from restored court"
                    );
                    let _ = court.take(slot);
                    report.dropped_duplicates += 1;
                    report.changes.courts.insert(court_no);
                }
            }

            if was_running {
                if court.is_empty() {
                    report.changes.courts.insert(court_no);
                } else if let Ok(generation) = court.clock.start(court_no, now_ms) {
                    report.changes.started_clocks.push((court_no, generation));
                    report.running += 1;
                }
            }
            self.courts.insert_restored(court);
            report.courts += 1;
        }

        for player in pool {
            if seen.contains(&player.id) {
                report.dropped_duplicates += 1;
                report.changes.pool = true;
                continue;
            }
            self.session.observe_player_id(&player.id);
            if self.pool.push_back(player) {
                report.pool += 1;
            }
        }
        report.changes.notified = self.session.seed_notified(notified);

        if self.courts.is_empty() {
            let court_no = self.courts.create();
            report.changes.courts.insert(court_no);
        }
        report.changes.preview = true;
        report
    }

    /// Full change set covering every persisted document, used to resync the store.
    pub fn everything(&self) -> ChangeSet {
        ChangeSet {
            courts: self.courts.numbers().into_iter().collect(),
            pool: true,
            notified: true,
            ..ChangeSet::default()
        }
    }

    /// Store key of a court in this session.
    pub fn court_key(&self, court_no: CourtNo) -> CourtKey {
        CourtKey {
            club_id: self.session.club_id().to_string(),
            date: self.session.date_key(),
            court_no,
        }
    }

    /// Snapshot of a court, `None` when it is idle (or gone) and its document should be deleted.
    pub fn court_snapshot(&self, court_no: CourtNo) -> Option<CourtSnapshotEntity> {
        let court = self.courts.get(court_no).ok()?;
        if court.is_idle() {
            return None;
        }
        Some(snapshot::court_to_entity(
            court,
            self.session.club_id(),
            &self.session.date_key(),
        ))
    }

    /// Current pool as a snapshot entity.
    pub fn pool_snapshot(&self) -> PoolSnapshotEntity {
        snapshot::pool_to_entity(
            self.pool.iter(),
            self.session.club_id(),
            &self.session.date_key(),
        )
    }

    /// Reported-present cache as a snapshot entity.
    pub fn notified_snapshot(&self) -> NotifiedSnapshotEntity {
        snapshot::notified_to_entity(
            self.session.notified_ids(),
            self.session.club_id(),
            &self.session.date_key(),
        )
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use time::macros::date;

    use super::*;
    use crate::state::{assignment::DEFAULT_CANDIDATE_WINDOW, pool::player};

    fn board() -> Board {
        Board::new("club", date!(2024 - 05 - 01), DEFAULT_CANDIDATE_WINDOW)
    }

    fn pool_ids(board: &Board) -> Vec<String> {
        board.pool().iter().map(|p| p.id.clone()).collect()
    }

    fn assert_exclusive(board: &Board) {
        let mut seen = HashSet::new();
        for id in board.pool().iter().map(|p| p.id.clone()) {
            assert!(seen.insert(id));
        }
        for court in board.courts().iter() {
            for id in court.player_ids() {
                assert!(seen.insert(id.clone()), "{id} appears twice");
            }
        }
    }

    fn seat(board: &mut Board, id: &str, court_no: CourtNo, slot: usize) {
        let index = board.pool().position(id).unwrap();
        board
            .transfer(TransferIntent {
                player_id: id.into(),
                source: Container::Pool,
                source_index: index,
                target: Container::Court(court_no),
                target_index: Some(slot),
            })
            .unwrap();
    }

    #[test]
    fn add_player_is_noop_when_on_court() {
        let mut board = board();
        board.add_player(player("a", Gender::Male));
        seat(&mut board, "a", 1, 0);
        assert!(board.add_player(player("a", Gender::Male)).is_empty());
        assert!(board.pool().is_empty());
        assert_exclusive(&board);
    }

    #[test]
    fn pool_to_occupied_slot_returns_displaced_to_front() {
        let mut board = board();
        for id in ["a", "b", "c"] {
            board.add_player(player(id, Gender::Male));
        }
        seat(&mut board, "a", 1, 0);
        seat(&mut board, "c", 1, 0);
        assert_eq!(pool_ids(&board), vec!["a", "b"]);
        assert_exclusive(&board);
    }

    #[test]
    fn cross_court_overwrite_keeps_displaced_player() {
        let mut board = board();
        board.create_court();
        for id in ["a", "b"] {
            board.add_player(player(id, Gender::Male));
        }
        seat(&mut board, "a", 1, 0);
        seat(&mut board, "b", 2, 1);
        let changes = board
            .transfer(TransferIntent {
                player_id: "a".into(),
                source: Container::Court(1),
                source_index: 0,
                target: Container::Court(2),
                target_index: Some(1),
            })
            .unwrap();
        assert!(changes.courts.contains(&1) && changes.courts.contains(&2));
        assert_eq!(pool_ids(&board), vec!["b"]);
        assert!(board.courts().get(1).unwrap().is_empty());
        assert_exclusive(&board);
    }

    #[test]
    fn same_court_move_swaps() {
        let mut board = board();
        for id in ["a", "b"] {
            board.add_player(player(id, Gender::Male));
        }
        seat(&mut board, "a", 1, 0);
        seat(&mut board, "b", 1, 2);
        board
            .transfer(TransferIntent {
                player_id: "a".into(),
                source: Container::Court(1),
                source_index: 0,
                target: Container::Court(1),
                target_index: Some(2),
            })
            .unwrap();
        assert_eq!(board.courts().locate("a"), Some((1, 2)));
        assert_eq!(board.courts().locate("b"), Some((1, 0)));
    }

    #[test]
    fn stale_transfer_is_rejected_without_change() {
        let mut board = board();
        for id in ["a", "b"] {
            board.add_player(player(id, Gender::Male));
        }
        let err = board
            .transfer(TransferIntent {
                player_id: "b".into(),
                source: Container::Pool,
                source_index: 0,
                target: Container::Court(1),
                target_index: Some(0),
            })
            .unwrap_err();
        assert_eq!(err, BoardError::StaleTransfer("b".into()));
        assert_eq!(pool_ids(&board), vec!["a", "b"]);
    }

    #[test]
    fn remove_court_returns_occupants_and_keeps_numbering() {
        let mut board = board();
        let (second, _) = board.create_court();
        board.add_player(player("a", Gender::Male));
        seat(&mut board, "a", second, 3);
        let changes = board.remove_court(second).unwrap();
        assert!(changes.removed_courts.contains(&second));
        assert!(changes.stopped_clocks.contains(&second));
        assert_eq!(pool_ids(&board), vec!["a"]);
        assert_eq!(board.create_court().0, second + 1);
    }

    #[test]
    fn finish_returns_winners_first_and_clears_court() {
        let mut board = board();
        for id in ["a1", "a2", "b1", "b2", "w"] {
            board.add_player(player(id, Gender::Male));
        }
        for (slot, id) in ["a1", "a2", "b1", "b2"].iter().enumerate() {
            seat(&mut board, id, 1, slot);
        }
        board.start_clock(1, 0).unwrap();
        let generation = board.courts().get(1).unwrap().clock().generation();
        for _ in 0..5 {
            board.tick(1, generation);
        }

        let (result, changes) = board.finish_match(1, "15", "21").unwrap();
        assert_eq!(result.final_score(), "15/21");
        assert_eq!(result.winner(), Team::B);
        assert_eq!(result.category, Some(Category::MD));
        assert_eq!(result.duration_seconds, 5);
        assert!(changes.stopped_clocks.contains(&1));
        assert_eq!(pool_ids(&board), vec!["b1", "b2", "a1", "a2", "w"]);
        assert!(board.courts().get(1).unwrap().is_idle());
        assert!(board.court_snapshot(1).is_none());
    }

    #[test]
    fn invalid_score_leaves_court_untouched() {
        let mut board = board();
        for id in ["a", "b"] {
            board.add_player(player(id, Gender::Female));
        }
        seat(&mut board, "a", 1, 0);
        seat(&mut board, "b", 1, 3);
        let before = board.courts().get(1).unwrap().clone();
        assert!(board.finish_match(1, "21", "20").is_err());
        assert_eq!(board.courts().get(1).unwrap(), &before);
    }

    #[test]
    fn start_requires_occupant() {
        let mut board = board();
        assert_eq!(board.start_clock(1, 0), Err(BoardError::CourtEmpty(1)));
    }

    #[test]
    fn auto_preview_confirm_flow() {
        let mut board = board();
        for id in ["a", "b", "c", "d", "e"] {
            board.add_player(player(id, Gender::Male));
        }
        let mut rng = StdRng::seed_from_u64(7);
        let (plan, _) = board.plan_auto(Category::MD, false, &mut rng).unwrap();
        assert_eq!(board.pool().len(), 5, "preview must not mutate");

        let (redo, _) = board.redo_auto(plan.id, &mut rng).unwrap();
        assert_ne!(redo.id, plan.id);
        assert_eq!(
            board.confirm_plan(plan.id, 0, true, 0),
            Err(BoardError::PreviewMismatch)
        );

        let (court_no, changes) = board.confirm_plan(redo.id, 0, true, 0).unwrap();
        assert_eq!(court_no, 1);
        assert_eq!(changes.started_clocks.len(), 1);
        assert_eq!(board.pool().len(), 1);
        assert_eq!(board.courts().get(1).unwrap().category(), Some(Category::MD));
        assert!(board.preview().is_none());
        assert_exclusive(&board);
    }

    #[test]
    fn stale_preview_is_detected() {
        let mut board = board();
        for id in ["a", "b", "c"] {
            board.add_player(player(id, Gender::Female));
        }
        let (plan, _) = board
            .plan_auto(Category::WS, false, &mut StdRng::seed_from_u64(0))
            .unwrap();
        board.remove_from_pool("a");
        assert!(matches!(
            board.confirm_plan(plan.id, 0, false, 0),
            Err(BoardError::PreviewStale(_))
        ));
    }

    #[test]
    fn no_free_court_for_auto() {
        let mut board = board();
        for id in ["a", "b", "c"] {
            board.add_player(player(id, Gender::Male));
        }
        seat(&mut board, "c", 1, 1);
        assert_eq!(
            board
                .plan_auto(Category::MS, false, &mut StdRng::seed_from_u64(0))
                .unwrap_err(),
            BoardError::NoFreeCourt
        );
    }

    #[test]
    fn guests_are_unique_and_trimmed() {
        let mut board = board();
        let (first, _) = board.add_guest(Gender::Female, "  Jo ").unwrap();
        let (second, _) = board.add_guest(Gender::Female, "Jo").unwrap();
        assert_eq!(first.display_name, "Jo");
        assert_ne!(first.id, second.id);
        assert_eq!(
            board.add_guest(Gender::Male, "   ").unwrap_err(),
            BoardError::EmptyGuestName
        );
    }

    #[test]
    fn restore_filters_duplicates_and_bumps_guests() {
        let mut source = board();
        let (guest, _) = source.add_guest(Gender::Male, "G").unwrap();
        source.add_player(player("p", Gender::Male));
        seat(&mut source, &guest.id, 1, 0);
        source.start_clock(1, 0).unwrap();

        let court = RestoredCourt {
            court: source.courts().get(1).unwrap().clone(),
            was_running: true,
        };
        let mut dup = court.clone();
        dup.court = {
            let mut c = crate::state::court::Court::new(4);
            c.put(0, guest.clone()).unwrap();
            c
        };

        let mut target = board();
        let report = target.restore(
            RestoredSession {
                courts: vec![dup, court],
                pool: vec![player("p", Gender::Male), guest.clone()],
                notified: vec!["p".into()],
            },
            50_000,
        );
        assert_eq!(report.courts, 2);
        assert_eq!(report.running, 1);
        assert_eq!(report.dropped_duplicates, 2);
        assert!(target.courts().get(4).unwrap().is_empty());
        assert_eq!(pool_ids(&target), vec!["p"]);
        assert!(target.is_notified("p"));
        let (next, _) = target.add_guest(Gender::Male, "H").unwrap();
        assert_eq!(next.id, "guest_male_2");
        assert_exclusive(&target);
    }

    #[test]
    fn restore_of_nothing_yields_default_court() {
        let mut board = board();
        board.create_court();
        let report = board.restore(RestoredSession::default(), 0);
        assert_eq!(report.courts, 0);
        assert_eq!(board.courts().numbers(), vec![1]);
    }

    #[test]
    fn rollover_resets_pool_and_keeps_courts() {
        let mut board = board();
        for id in ["a", "b"] {
            board.add_player(player(id, Gender::Male));
        }
        seat(&mut board, "a", 1, 0);
        board.mark_notified("a");
        let changes = board.roll_over(date!(2024 - 05 - 02));
        assert!(changes.pool && changes.notified);
        assert!(board.pool().is_empty());
        assert!(!board.is_notified("a"));
        assert_eq!(board.courts().locate("a"), Some((1, 0)));
        assert_eq!(board.court_key(1).date, "2024-05-02");
        assert!(board.roll_over(date!(2024 - 05 - 02)).is_empty());
    }
}
