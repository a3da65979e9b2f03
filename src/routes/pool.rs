use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        board::BoardView,
        pool::{
            AddGuestRequest, AddPlayerRequest, GuestCreatedResponse, ReorderPoolRequest,
            TransferRequest,
        },
    },
    error::AppError,
    services::board_service,
    state::SharedState,
};

/// Routes managing the waiting pool and player transfers.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/pool/players", post(add_player))
        .route("/pool/players/{player_id}", delete(remove_player))
        .route("/pool/guests", post(add_guest))
        .route("/pool/reorder", post(reorder_pool))
        .route("/transfers", post(transfer))
}

/// Add a roster member to the pool and report them present.
#[utoipa::path(
    post,
    path = "/pool/players",
    tag = "pool",
    request_body = AddPlayerRequest,
    responses(
        (status = 200, description = "Player waiting", body = BoardView),
        (status = 404, description = "Unknown roster member")
    )
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddPlayerRequest>>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::add_roster_player(&state, &payload.player_id).await?))
}

/// Remove a player from the pool. Removing a guest discards it.
#[utoipa::path(
    delete,
    path = "/pool/players/{player_id}",
    tag = "pool",
    params(("player_id" = String, Path, description = "Player identifier")),
    responses((status = 200, description = "Player removed", body = BoardView))
)]
pub async fn remove_player(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::remove_from_pool(&state, &player_id).await?))
}

/// Create a guest and append it to the pool.
#[utoipa::path(
    post,
    path = "/pool/guests",
    tag = "pool",
    request_body = AddGuestRequest,
    responses(
        (status = 200, description = "Guest created", body = GuestCreatedResponse),
        (status = 422, description = "Blank guest name")
    )
)]
pub async fn add_guest(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AddGuestRequest>>,
) -> Result<Json<GuestCreatedResponse>, AppError> {
    let (guest, board) = board_service::add_guest(&state, payload.gender, &payload.name).await?;
    Ok(Json(GuestCreatedResponse { guest, board }))
}

/// Move a pool entry to another position.
#[utoipa::path(
    post,
    path = "/pool/reorder",
    tag = "pool",
    request_body = ReorderPoolRequest,
    responses(
        (status = 200, description = "Pool reordered", body = BoardView),
        (status = 422, description = "Index out of range")
    )
)]
pub async fn reorder_pool(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<ReorderPoolRequest>>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::reorder_pool(&state, payload.from, payload.to).await?))
}

/// Move one player between the pool and court slots.
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "pool",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer applied", body = BoardView),
        (status = 409, description = "Player is not at the stated source")
    )
)]
pub async fn transfer(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<TransferRequest>>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(board_service::transfer(&state, payload.into()).await?))
}
