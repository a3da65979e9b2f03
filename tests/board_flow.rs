mod common;

use std::{sync::atomic::Ordering, time::Duration};

use common::{FakeClub, app, drain, eventually, member, named, pool_ids};
use pegboard_back::{
    error::ServiceError,
    integrations::models::{AttendanceRecord, SuggestionOption},
    services::{assignment_service, attendance_notifier, board_service, sse_service},
    state::{
        BoardError, SharedState,
        assignment::{Category, Container, TransferIntent},
        court::CourtNo,
        pool::Gender,
        score::ScoreError,
    },
};

fn doubles_roster() -> Vec<pegboard_back::integrations::models::RosterPlayer> {
    vec![
        member("m1", "Adam", "Male"),
        member("m2", "Ben", "Male"),
        member("m3", "Carl", "Male"),
        member("m4", "Dan", "Male"),
        member("m5", "Eli", "Male"),
        member("f1", "Fay", "Female"),
        member("f2", "Gia", "Female"),
    ]
}

/// Move a waiting player onto a court slot the way a drag from the pool would.
async fn seat(state: &SharedState, player_id: &str, court_no: CourtNo, slot: usize) {
    let source_index = pool_ids(state)
        .await
        .iter()
        .position(|id| id == player_id)
        .expect("player waiting");
    board_service::transfer(
        state,
        TransferIntent {
            player_id: player_id.to_string(),
            source: Container::Pool,
            source_index,
            target: Container::Court(court_no),
            target_index: Some(slot),
        },
    )
    .await
    .expect("transfer accepted");
}

async fn occupants(state: &SharedState, court_no: CourtNo) -> Vec<Option<String>> {
    let board = state.board().read().await;
    let court = board.courts().get(court_no).expect("court exists");
    court
        .slots()
        .iter()
        .map(|slot| slot.as_ref().map(|p| p.id.clone()))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn finished_match_returns_players_and_files_result() {
    let club =
        FakeClub::with_members(vec![member("a", "Ann", "Male"), member("b", "Bea", "Female")]);
    let state = app(&club);

    board_service::add_roster_player(&state, "a").await.unwrap();
    board_service::add_roster_player(&state, "b").await.unwrap();
    seat(&state, "a", 1, 0).await;
    seat(&state, "b", 1, 2).await;
    board_service::start_clock(&state, 1).await.unwrap();

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let view = board_service::set_score(&state, 1, "21/15").await.unwrap();
    assert_eq!(view.courts[0].score, "21/15");
    assert_eq!(view.courts[0].elapsed_ms, 2_000);
    assert_eq!(view.courts[0].elapsed, "00:02");

    let (result, view) = board_service::finish_match(&state, 1, "21", "15").await.unwrap();
    assert_eq!(result.duration_seconds, 2);
    assert_eq!(result.final_score(), "21/15");
    assert!(view.courts[0].slots.iter().all(Option::is_none));
    assert!(!view.courts[0].is_running);
    assert_eq!(view.courts[0].elapsed_ms, 0);
    assert_eq!(pool_ids(&state).await, vec!["a", "b"]);
    assert!(!state.clocks().is_active(&1));

    eventually(|| club.reports().len() == 1).await;
    let report = &club.reports()[0];
    assert_eq!(report.winner, "A");
    assert_eq!(report.teams.team_a, vec!["a"]);
    assert_eq!(report.teams.team_b, vec!["b"]);
    assert_eq!(report.duration_seconds, 2);
}

#[tokio::test]
async fn winners_rejoin_the_pool_ahead_of_losers() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    for id in ["m1", "m2", "m3", "m4", "m5"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }
    for (slot, id) in ["m1", "m2", "m3", "m4"].into_iter().enumerate() {
        seat(&state, id, 1, slot).await;
    }

    board_service::finish_match(&state, 1, "19", "21").await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m3", "m4", "m1", "m2", "m5"]);
}

#[tokio::test]
async fn auto_assignment_fills_the_free_court_on_confirm() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    for id in ["m1", "f1", "m2", "m3", "m4"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }

    let preview = assignment_service::auto(&state, Category::MD, false).await.unwrap();
    assert_eq!(preview.court_no, 1);
    assert!(preview.warning.is_none());
    let ids: Vec<String> = preview.options[0]
        .slots
        .iter()
        .flatten()
        .map(|p| p.id.clone())
        .collect();
    assert_eq!(ids.len(), 4);
    assert!(ids.contains(&"m1".to_string()));
    assert!(!ids.contains(&"f1".to_string()));

    let redrawn = assignment_service::redo(&state, preview.plan_id).await.unwrap();
    assert_ne!(redrawn.plan_id, preview.plan_id);
    let stale = assignment_service::confirm(&state, preview.plan_id, 0, true).await;
    assert!(matches!(stale, Err(ServiceError::Rejected(BoardError::PreviewMismatch))));

    let view = assignment_service::confirm(&state, redrawn.plan_id, 0, true).await.unwrap();
    assert!(view.preview.is_none());
    assert!(view.courts[0].slots.iter().all(Option::is_some));
    assert!(view.courts[0].is_running);
    assert_eq!(view.courts[0].category, Some(Category::MD));
    assert_eq!(pool_ids(&state).await, vec!["f1"]);

    let none_free = assignment_service::auto(&state, Category::MD, false).await;
    assert!(matches!(none_free, Err(ServiceError::Rejected(BoardError::NoFreeCourt))));
    state.clocks().cancel_all();
}

#[tokio::test]
async fn singles_preview_uses_the_diagonal() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    for id in ["f1", "m1", "f2"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }

    let preview = assignment_service::auto(&state, Category::WS, false).await.unwrap();
    let slots = &preview.options[0].slots;
    assert_eq!(slots[0].as_ref().map(|p| p.id.as_str()), Some("f1"));
    assert!(slots[1].is_none() && slots[2].is_none());
    assert_eq!(slots[3].as_ref().map(|p| p.id.as_str()), Some("f2"));

    assignment_service::cancel(&state, preview.plan_id).await.unwrap();
    let again = assignment_service::cancel(&state, preview.plan_id).await;
    assert!(matches!(again, Err(ServiceError::Rejected(BoardError::NoPendingPreview))));
}

#[tokio::test]
async fn capped_score_is_rejected_without_touching_the_court() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m2").await.unwrap();
    seat(&state, "m1", 1, 0).await;
    seat(&state, "m2", 1, 3).await;
    let before = occupants(&state, 1).await;

    let rejected = board_service::finish_match(&state, 1, "30", "31").await;
    assert!(matches!(
        rejected,
        Err(ServiceError::Rejected(BoardError::InvalidScore(ScoreError::ScoreCapExceeded)))
    ));
    assert_eq!(occupants(&state, 1).await, before);
    assert!(pool_ids(&state).await.is_empty());
    assert!(club.reports().is_empty());
}

#[tokio::test]
async fn abandon_clears_without_a_result() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    seat(&state, "m1", 1, 1).await;

    board_service::abandon(&state, 1).await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m1"]);

    let empty = board_service::abandon(&state, 1).await;
    assert!(matches!(empty, Err(ServiceError::Rejected(BoardError::CourtEmpty(1)))));
    tokio::task::yield_now().await;
    assert!(club.reports().is_empty());
}

#[tokio::test(start_paused = true)]
async fn running_clock_ticks_reach_subscribers() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    seat(&state, "m1", 1, 0).await;
    let mut events = sse_service::subscribe(&state);

    board_service::start_clock(&state, 1).await.unwrap();
    let again = board_service::start_clock(&state, 1).await;
    assert!(matches!(again, Err(ServiceError::Rejected(BoardError::ClockAlreadyRunning(1)))));

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    let received = drain(&mut events);
    let ticks = named(&received, "clock.tick");
    assert_eq!(ticks.len(), 3);
    let last: serde_json::Value = serde_json::from_str(&ticks[2].data).unwrap();
    assert_eq!(last["court_no"], 1);
    assert_eq!(last["elapsed_ms"], 3_000);

    board_service::stop_clock(&state, 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3_000)).await;
    assert!(named(&drain(&mut events), "clock.tick").is_empty());
    let view = board_service::board_view(&state).await;
    assert_eq!(view.courts[0].elapsed_ms, 3_000);
}

#[tokio::test]
async fn player_sits_in_exactly_one_place() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m2").await.unwrap();
    seat(&state, "m1", 1, 0).await;

    // Adding someone already on court changes nothing.
    board_service::add_roster_player(&state, "m1").await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m2"]);

    let stale = board_service::transfer(
        &state,
        TransferIntent {
            player_id: "m1".into(),
            source: Container::Pool,
            source_index: 0,
            target: Container::Court(1),
            target_index: Some(1),
        },
    )
    .await;
    assert!(matches!(stale, Err(ServiceError::Rejected(BoardError::StaleTransfer(_)))));

    // Dropping onto an occupied slot sends the occupant back to the pool head.
    seat(&state, "m2", 1, 0).await;
    assert_eq!(occupants(&state, 1).await[0].as_deref(), Some("m2"));
    assert_eq!(pool_ids(&state).await, vec!["m1"]);
}

#[tokio::test]
async fn removing_a_court_returns_its_players() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    let (court_no, _) = board_service::create_court(&state).await.unwrap();
    assert_eq!(court_no, 2);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m2").await.unwrap();
    seat(&state, "m1", 2, 0).await;

    board_service::remove_court(&state, 2).await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m1", "m2"]);
    let missing = board_service::remove_court(&state, 2).await;
    assert!(matches!(missing, Err(ServiceError::Rejected(BoardError::CourtNotFound(2)))));

    let (next, _) = board_service::create_court(&state).await.unwrap();
    assert_eq!(next, 3);
}

#[tokio::test]
async fn pool_edits_are_idempotent() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m1").await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m1"]);

    let mut events = sse_service::subscribe(&state);
    board_service::remove_from_pool(&state, "nobody").await.unwrap();
    assert!(named(&drain(&mut events), "board.updated").is_empty());

    board_service::remove_from_pool(&state, "m1").await.unwrap();
    assert!(pool_ids(&state).await.is_empty());
    assert_eq!(named(&drain(&mut events), "board.updated").len(), 1);

    let unknown = board_service::add_roster_player(&state, "ghost").await;
    assert!(matches!(unknown, Err(ServiceError::Rejected(BoardError::PlayerNotFound(_)))));
}

#[tokio::test]
async fn guests_get_distinct_ids_and_need_a_name() {
    let club = FakeClub::with_members(Vec::new());
    let state = app(&club);

    let (first, _) = board_service::add_guest(&state, Gender::Male, "  Sam ").await.unwrap();
    let (second, _) = board_service::add_guest(&state, Gender::Male, "Sam").await.unwrap();
    assert_eq!(first.display_name, "Sam");
    assert!(first.is_guest);
    assert_ne!(first.id, second.id);

    let blank = board_service::add_guest(&state, Gender::Female, "   ").await;
    assert!(matches!(blank, Err(ServiceError::Rejected(BoardError::EmptyGuestName))));
    assert_eq!(pool_ids(&state).await.len(), 2);
    tokio::task::yield_now().await;
    assert!(club.reported_present().is_empty());
}

#[tokio::test]
async fn attendance_is_reported_once_per_day() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);

    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::remove_from_pool(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m1").await.unwrap();
    eventually(|| club.reported_present() == vec!["m1"]).await;

    let batch = club.present_batches.lock().unwrap()[0].clone();
    assert_eq!(batch.club_id, "club");
    assert_eq!(batch.records[0].status, "Present");
    assert_eq!(batch.records[0].date, common::session_date(&state).await);
}

#[tokio::test]
async fn players_already_present_upstream_are_not_reported_again() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    let today = common::session_date(&state).await;
    *club.present_records.lock().unwrap() = vec![
        AttendanceRecord {
            player_id: "m2".into(),
            date: format!("{today}T00:00:00Z"),
            day: String::new(),
            status: "Present".into(),
        },
        AttendanceRecord {
            player_id: "m3".into(),
            date: "2000-01-01".into(),
            day: String::new(),
            status: "Present".into(),
        },
    ];

    let seeded = attendance_notifier::seed_from_attendance(&state).await.unwrap();
    assert_eq!(seeded, 1);
    board_service::add_roster_player(&state, "m2").await.unwrap();
    board_service::add_roster_player(&state, "m3").await.unwrap();
    eventually(|| club.reported_present() == vec!["m3"]).await;
}

#[tokio::test]
async fn attendance_outage_keeps_players_and_warns_once() {
    let club = FakeClub::with_members(doubles_roster());
    club.attendance_down.store(true, Ordering::SeqCst);
    let state = app(&club);
    let mut events = sse_service::subscribe(&state);

    board_service::add_roster_player(&state, "m1").await.unwrap();
    board_service::add_roster_player(&state, "m2").await.unwrap();
    eventually(|| club.reported_present().len() == 2).await;
    tokio::task::yield_now().await;

    assert_eq!(pool_ids(&state).await, vec!["m1", "m2"]);
    let received = drain(&mut events);
    let notices = named(&received, "notice");
    assert_eq!(notices.len(), 1);
    assert!(notices[0].data.contains("attendance"));
}

#[tokio::test]
async fn roster_outage_falls_back_to_the_cached_roster() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    let roster = board_service::roster(&state).await.unwrap();
    assert_eq!(roster.len(), 7);
    assert_eq!(roster[0].player.display_name, "Adam Tester");

    board_service::add_roster_player(&state, "m1").await.unwrap();
    club.roster_down.store(true, Ordering::SeqCst);
    let cached = board_service::roster(&state).await.unwrap();
    assert!(cached.iter().any(|entry| entry.player.id == "m1" && entry.present));

    let cold = app(&club);
    assert!(matches!(
        board_service::roster(&cold).await,
        Err(ServiceError::Integration(_))
    ));
}

#[tokio::test]
async fn smart_preview_keeps_only_playable_groupings() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    for id in ["m1", "f1", "m2", "f2", "m3"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }
    *club.suggestions.lock().unwrap() = vec![
        SuggestionOption {
            label: "balanced".into(),
            player_ids: vec!["m1".into(), "f1".into(), "m2".into(), "f2".into()],
        },
        SuggestionOption {
            label: "someone absent".into(),
            player_ids: vec!["m1".into(), "f1".into(), "m2".into(), "m9".into()],
        },
        SuggestionOption {
            label: "too few".into(),
            player_ids: vec!["m1".into(), "f1".into()],
        },
    ];

    let preview = assignment_service::smart(&state, Category::XD).await.unwrap();
    assert_eq!(preview.options.len(), 1);
    assert_eq!(preview.options[0].label.as_deref(), Some("balanced"));
    let request = club.suggestion_requests.lock().unwrap()[0].clone();
    assert_eq!(request.pool.len(), 5);
    assert_eq!(request.courts[0].court_no, 1);

    assignment_service::confirm(&state, preview.plan_id, 0, false).await.unwrap();
    assert_eq!(pool_ids(&state).await, vec!["m3"]);
}

#[tokio::test]
async fn smart_outage_is_reported_and_board_kept() {
    let club = FakeClub::with_members(doubles_roster());
    club.suggestions_down.store(true, Ordering::SeqCst);
    let state = app(&club);
    for id in ["m1", "f1", "m2", "f2"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }
    let mut events = sse_service::subscribe(&state);

    let failed = assignment_service::smart(&state, Category::XD).await;
    assert!(matches!(failed, Err(ServiceError::Integration(_))));
    assert!(state.board().read().await.preview().is_none());
    assert_eq!(named(&drain(&mut events), "notice").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn new_match_never_inherits_a_leftover_clock() {
    let club = FakeClub::with_members(doubles_roster());
    let state = app(&club);
    for id in ["m1", "m2", "m3", "m4", "m5"] {
        board_service::add_roster_player(&state, id).await.unwrap();
    }
    seat(&state, "m5", 1, 0).await;
    board_service::start_clock(&state, 1).await.unwrap();
    tokio::time::sleep(Duration::from_secs(600)).await;

    // The last player leaves while the clock keeps running.
    board_service::transfer(
        &state,
        TransferIntent {
            player_id: "m5".into(),
            source: Container::Court(1),
            source_index: 0,
            target: Container::Pool,
            target_index: None,
        },
    )
    .await
    .unwrap();
    let busy = assignment_service::auto(&state, Category::MD, false).await;
    assert!(matches!(busy, Err(ServiceError::Rejected(BoardError::NoFreeCourt))));

    let (court_no, _) = board_service::create_court(&state).await.unwrap();
    let preview = assignment_service::auto(&state, Category::MD, false).await.unwrap();
    assert_eq!(preview.court_no, court_no);
    let view = assignment_service::confirm(&state, preview.plan_id, 0, true).await.unwrap();
    let court = view.courts.iter().find(|c| c.court_no == court_no).unwrap();
    assert!(court.is_running);
    assert_eq!(court.elapsed_ms, 0);

    board_service::stop_clock(&state, 1).await.unwrap();
    let stopped = assignment_service::auto(&state, Category::MD, false).await;
    assert!(matches!(stopped, Err(ServiceError::Rejected(BoardError::InsufficientPlayers { .. }))));
    state.clocks().cancel_all();
}
