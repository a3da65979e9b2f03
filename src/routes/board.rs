use axum::{Json, Router, extract::State, routing::get};

use crate::{
    dto::{board::BoardView, pool::RosterEntryView},
    error::AppError,
    services::board_service,
    state::SharedState,
};

/// Routes exposing the board and the club roster.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/board", get(get_board))
        .route("/roster", get(get_roster))
}

/// Return the full board: courts, pool and pending preview.
#[utoipa::path(
    get,
    path = "/board",
    tag = "board",
    responses((status = 200, description = "Current board", body = BoardView))
)]
pub async fn get_board(State(state): State<SharedState>) -> Json<BoardView> {
    Json(board_service::board_view(&state).await)
}

/// List roster members, flagging those already present tonight.
#[utoipa::path(
    get,
    path = "/roster",
    tag = "board",
    responses(
        (status = 200, description = "Club roster", body = [RosterEntryView]),
        (status = 502, description = "Roster service unavailable")
    )
)]
pub async fn get_roster(
    State(state): State<SharedState>,
) -> Result<Json<Vec<RosterEntryView>>, AppError> {
    let entries = board_service::roster(&state).await?;
    Ok(Json(entries))
}
