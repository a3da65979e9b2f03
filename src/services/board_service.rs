//! Board mutations driven by the REST layer.
//!
//! Every mutation runs inside one critical section of the board lock: the board is
//! changed, snapshot writes are enqueued and clock tasks are started or cancelled before
//! the lock is released, so the durable mirror sees changes in mutation order.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::{
    dao::snapshot_store::writer::{SnapshotWrite, SnapshotWriter},
    dto::{
        board::{BoardView, PlayerView},
        pool::RosterEntryView,
    },
    error::ServiceError,
    integrations::models::{MatchReport, MatchTeams},
    services::{attendance_notifier, clock_service, sse_events},
    state::{
        BoardError, NoticeKind, SharedState,
        assignment::TransferIntent,
        board::{Board, ChangeSet},
        court::CourtNo,
        pool::{Gender, Player, PlayerId},
        score::{MatchResult, Team},
        session::{format_date, now_ms},
    },
};

/// Apply `op` under the board write lock, mirror its change set and broadcast the new board.
pub(crate) async fn mutate<T, F>(state: &SharedState, op: F) -> Result<(T, BoardView), ServiceError>
where
    F: FnOnce(&mut Board) -> Result<(T, ChangeSet), BoardError>,
{
    let (value, view, changed) = {
        let mut board = state.board().write().await;
        let (value, changes) = op(&mut board)?;
        apply_changes(state, &board, &changes);
        (value, BoardView::from(&*board), !changes.is_empty())
    };
    if changed {
        sse_events::broadcast_board(state, &view);
    }
    Ok((value, view))
}

/// Enqueue snapshot writes and start/cancel clock tasks for `changes`.
///
/// Must run under the board lock.
pub(crate) fn apply_changes(state: &SharedState, board: &Board, changes: &ChangeSet) {
    persist_changes(state.writer(), board, changes);
    for court_no in changes.removed_courts.iter().chain(&changes.stopped_clocks) {
        if state.clocks().cancel(court_no) {
            debug!(court_no, "clock task cancelled");
        }
    }
    for (court_no, generation) in &changes.started_clocks {
        clock_service::spawn_clock(state, *court_no, *generation);
    }
}

/// Translate a change set into ordered snapshot writes.
pub(crate) fn persist_changes(writer: &SnapshotWriter, board: &Board, changes: &ChangeSet) {
    for court_no in &changes.courts {
        match board.court_snapshot(*court_no) {
            Some(snapshot) => writer.enqueue(SnapshotWrite::PutCourt(snapshot)),
            None => writer.enqueue(SnapshotWrite::DeleteCourt(board.court_key(*court_no))),
        }
    }
    for court_no in changes.removed_courts.difference(&changes.courts) {
        writer.enqueue(SnapshotWrite::DeleteCourt(board.court_key(*court_no)));
    }
    if changes.pool {
        writer.enqueue(SnapshotWrite::PutPool(board.pool_snapshot()));
    }
    if changes.notified {
        writer.enqueue(SnapshotWrite::PutNotified(board.notified_snapshot()));
    }
}

/// Current board view.
pub async fn board_view(state: &SharedState) -> BoardView {
    let board = state.board().read().await;
    BoardView::from(&*board)
}

/// Refresh the roster cache from the roster collaborator.
///
/// On failure the cached roster is kept and returned when there is one.
async fn refresh_roster(state: &SharedState) -> Result<HashMap<PlayerId, Player>, ServiceError> {
    let club_id = state.config().club_id.clone();
    match state.integrations().roster.fetch_players(club_id).await {
        Ok(members) => {
            let fetched = members.len();
            let players: HashMap<PlayerId, Player> = members
                .iter()
                .filter_map(|member| {
                    let player = member.to_player();
                    if player.is_none() {
                        warn!(
                            player_id = %member.id,
                            gender = %member.gender,
                            "skipping roster member with unknown gender"
                        );
                    }
                    player
                })
                .map(|player| (player.id.clone(), player))
                .collect();
            debug!(fetched, usable = players.len(), "roster refreshed");
            *state.roster().write().await = players.clone();
            Ok(players)
        }
        Err(err) => {
            warn!(error = %err, "roster fetch failed");
            sse_events::broadcast_notice(
                state,
                NoticeKind::Roster,
                "The club roster could not be loaded",
            );
            let cached = state.roster().read().await.clone();
            if cached.is_empty() {
                Err(err.into())
            } else {
                Ok(cached)
            }
        }
    }
}

/// Roster members sorted by name, flagged when already waiting or playing.
pub async fn roster(state: &SharedState) -> Result<Vec<RosterEntryView>, ServiceError> {
    let players = refresh_roster(state).await?;
    let board = state.board().read().await;
    let mut entries: Vec<RosterEntryView> = players
        .values()
        .map(|player| RosterEntryView {
            player: PlayerView::from(player),
            present: board.is_present(&player.id),
        })
        .collect();
    entries.sort_by(|a, b| {
        a.player
            .display_name
            .to_lowercase()
            .cmp(&b.player.display_name.to_lowercase())
            .then_with(|| a.player.id.cmp(&b.player.id))
    });
    Ok(entries)
}

/// Cached roster member, refreshing the cache once on a miss.
async fn lookup_roster_player(
    state: &SharedState,
    player_id: &str,
) -> Result<Player, ServiceError> {
    if let Some(player) = state.roster().read().await.get(player_id).cloned() {
        return Ok(player);
    }
    refresh_roster(state)
        .await?
        .remove(player_id)
        .ok_or_else(|| BoardError::PlayerNotFound(player_id.to_string()).into())
}

/// Add a roster member to the pool and report them present the first time today.
pub async fn add_roster_player(
    state: &SharedState,
    player_id: &str,
) -> Result<BoardView, ServiceError> {
    let player = lookup_roster_player(state, player_id).await?;
    let (notify, view) = mutate(state, |board| {
        let mut changes = board.add_player(player);
        let notify = board.mark_notified(player_id).then(|| {
            changes.notified = true;
            (
                board.session().club_id().to_string(),
                board.session().date(),
            )
        });
        Ok((notify, changes))
    })
    .await?;

    if let Some((club_id, date)) = notify {
        attendance_notifier::dispatch_present(state, club_id, date, player_id.to_string());
    }
    Ok(view)
}

/// Create a guest and append it to the pool.
pub async fn add_guest(
    state: &SharedState,
    gender: Gender,
    name: &str,
) -> Result<(PlayerView, BoardView), ServiceError> {
    let (guest, view) = mutate(state, |board| board.add_guest(gender, name)).await?;
    info!(player_id = %guest.id, "guest added");
    Ok((PlayerView::from(&guest), view))
}

/// Remove a player from the pool; absent players are ignored.
pub async fn remove_from_pool(
    state: &SharedState,
    player_id: &str,
) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.remove_from_pool(player_id)))).await?;
    Ok(view)
}

/// Move a waiting player to another pool position.
pub async fn reorder_pool(
    state: &SharedState,
    from: usize,
    to: usize,
) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.reorder_pool(from, to)?))).await?;
    Ok(view)
}

/// Apply a transfer intent.
pub async fn transfer(
    state: &SharedState,
    intent: TransferIntent,
) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.transfer(intent)?))).await?;
    Ok(view)
}

/// Append a court numbered after the highest existing one.
pub async fn create_court(state: &SharedState) -> Result<(CourtNo, BoardView), ServiceError> {
    let (court_no, view) = mutate(state, |board| Ok(board.create_court())).await?;
    info!(court_no, "court created");
    Ok((court_no, view))
}

/// Remove a court; its clock is cancelled and its players return to the pool.
pub async fn remove_court(
    state: &SharedState,
    court_no: CourtNo,
) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.remove_court(court_no)?))).await?;
    info!(court_no, "court removed");
    Ok(view)
}

/// Replace the live score text of a court.
pub async fn set_score(
    state: &SharedState,
    court_no: CourtNo,
    score: &str,
) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.set_score(court_no, score)?))).await?;
    Ok(view)
}

/// Start or resume the match clock of an occupied court.
pub async fn start_clock(
    state: &SharedState,
    court_no: CourtNo,
) -> Result<BoardView, ServiceError> {
    let now = now_ms();
    let (_, view) = mutate(state, |board| Ok(((), board.start_clock(court_no, now)?))).await?;
    info!(court_no, "clock started");
    Ok(view)
}

/// Halt a running clock, keeping its elapsed time.
pub async fn stop_clock(state: &SharedState, court_no: CourtNo) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.stop_clock(court_no)?))).await?;
    info!(court_no, "clock stopped");
    Ok(view)
}

/// Validate and finalize a match, then forward the result to the match history.
pub async fn finish_match(
    state: &SharedState,
    court_no: CourtNo,
    team_a: &str,
    team_b: &str,
) -> Result<(MatchResult, BoardView), ServiceError> {
    let ((result, report), view) = mutate(state, |board| {
        let (result, changes) = board.finish_match(court_no, team_a, team_b)?;
        let report = match_report(board, &result);
        Ok(((result, report), changes))
    })
    .await?;

    info!(
        court_no,
        score = %result.final_score(),
        duration_seconds = result.duration_seconds,
        "match finalized"
    );
    sse_events::broadcast_match_finalized(state, &result);
    forward_result(state, report);
    Ok((result, view))
}

/// Clear a court without a result.
pub async fn abandon(state: &SharedState, court_no: CourtNo) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.abandon(court_no)?))).await?;
    info!(court_no, "match abandoned");
    Ok(view)
}

fn winner_label(team: Team) -> &'static str {
    match team {
        Team::A => "A",
        Team::B => "B",
    }
}

fn player_ids(players: &[Player]) -> Vec<PlayerId> {
    players.iter().map(|p| p.id.clone()).collect()
}

fn match_report(board: &Board, result: &MatchResult) -> MatchReport {
    MatchReport {
        club_id: board.session().club_id().to_string(),
        date: format_date(board.session().date()),
        court_no: result.court_no,
        category: result.category,
        teams: MatchTeams {
            team_a: player_ids(&result.team_a),
            team_b: player_ids(&result.team_b),
        },
        final_score: result.final_score(),
        winner: winner_label(result.winner()).to_string(),
        duration_seconds: result.duration_seconds,
    }
}

fn forward_result(state: &SharedState, report: MatchReport) {
    let state = state.clone();
    tokio::spawn(async move {
        let court_no = report.court_no;
        if let Err(err) = state.integrations().match_history.record(report).await {
            warn!(court_no, error = %err, "failed to forward match result");
            sse_events::broadcast_notice(
                &state,
                NoticeKind::MatchHistory,
                "Match results could not be saved to the club history",
            );
        }
    });
}
