use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::{
        board::{BoardView, MatchResultView},
        court::{CourtCreatedResponse, FinishMatchRequest, FinishMatchResponse, ScoreDraftRequest},
    },
    error::AppError,
    services::board_service,
    state::{SharedState, court::CourtNo},
};

/// Routes managing courts, their clocks and match outcomes.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/courts", post(create_court))
        .route("/courts/{court_no}", delete(remove_court))
        .route("/courts/{court_no}/clock/start", post(start_clock))
        .route("/courts/{court_no}/clock/stop", post(stop_clock))
        .route("/courts/{court_no}/score", put(set_score))
        .route("/courts/{court_no}/finish", post(finish_match))
        .route("/courts/{court_no}/abandon", post(abandon_match))
}

/// Add a court numbered after the highest court ever created.
#[utoipa::path(
    post,
    path = "/courts",
    tag = "courts",
    responses((status = 200, description = "Court created", body = CourtCreatedResponse))
)]
pub async fn create_court(
    State(state): State<SharedState>,
) -> Result<Json<CourtCreatedResponse>, AppError> {
    let (court_no, board) = board_service::create_court(&state).await?;
    Ok(Json(CourtCreatedResponse { court_no, board }))
}

/// Remove a court; its players go back to the front of the pool.
#[utoipa::path(
    delete,
    path = "/courts/{court_no}",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    responses(
        (status = 200, description = "Court removed", body = BoardView),
        (status = 404, description = "Unknown court")
    )
)]
pub async fn remove_court(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::remove_court(&state, court_no).await?))
}

/// Start or resume the match clock of a court.
#[utoipa::path(
    post,
    path = "/courts/{court_no}/clock/start",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    responses(
        (status = 200, description = "Clock running", body = BoardView),
        (status = 409, description = "Court empty or clock already running")
    )
)]
pub async fn start_clock(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::start_clock(&state, court_no).await?))
}

/// Stop the match clock of a court; the elapsed time stays displayed.
#[utoipa::path(
    post,
    path = "/courts/{court_no}/clock/stop",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    responses(
        (status = 200, description = "Clock stopped", body = BoardView),
        (status = 409, description = "Clock not running")
    )
)]
pub async fn stop_clock(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::stop_clock(&state, court_no).await?))
}

/// Store the live score text shown on a court.
#[utoipa::path(
    put,
    path = "/courts/{court_no}/score",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    request_body = ScoreDraftRequest,
    responses((status = 200, description = "Score stored", body = BoardView))
)]
pub async fn set_score(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
    Valid(Json(payload)): Valid<Json<ScoreDraftRequest>>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::set_score(&state, court_no, &payload.score).await?))
}

/// Validate the final score, clear the court and file the result.
#[utoipa::path(
    post,
    path = "/courts/{court_no}/finish",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    request_body = FinishMatchRequest,
    responses(
        (status = 200, description = "Match finalized", body = FinishMatchResponse),
        (status = 422, description = "Score rejected; the court is unchanged")
    )
)]
pub async fn finish_match(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
    Valid(Json(payload)): Valid<Json<FinishMatchRequest>>,
) -> Result<Json<FinishMatchResponse>, AppError> {
    let (team_a, team_b) = payload.into_texts();
    let (result, board) = board_service::finish_match(&state, court_no, &team_a, &team_b).await?;
    Ok(Json(FinishMatchResponse {
        result: MatchResultView::from(&result),
        board,
    }))
}

/// Clear a court without recording a result.
#[utoipa::path(
    post,
    path = "/courts/{court_no}/abandon",
    tag = "courts",
    params(("court_no" = u32, Path, description = "Court number")),
    responses(
        (status = 200, description = "Match abandoned", body = BoardView),
        (status = 409, description = "Nothing to abandon")
    )
)]
pub async fn abandon_match(
    State(state): State<SharedState>,
    Path(court_no): Path<CourtNo>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::abandon(&state, court_no).await?))
}
