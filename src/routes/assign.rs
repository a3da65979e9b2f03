use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use axum_valid::Valid;

use crate::{
    dto::{
        assign::{AutoAssignRequest, ConfirmPlanRequest, SmartAssignRequest},
        board::{BoardView, PreviewView},
    },
    error::AppError,
    services::assignment_service,
    state::{SharedState, assignment::PlanId},
};

/// Routes producing and resolving assignment previews.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/assign/auto", post(auto_assign))
        .route("/assign/auto/{plan_id}/redo", post(redo_auto))
        .route("/assign/smart", post(smart_assign))
        .route("/assign/{plan_id}/confirm", post(confirm_plan))
        .route("/assign/{plan_id}", delete(cancel_plan))
}

/// Draw a random line-up around the first player of the pool.
#[utoipa::path(
    post,
    path = "/assign/auto",
    tag = "assign",
    request_body = AutoAssignRequest,
    responses(
        (status = 200, description = "Preview drawn", body = PreviewView),
        (status = 409, description = "No free court or not enough eligible players")
    )
)]
pub async fn auto_assign(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<AutoAssignRequest>>,
) -> Result<Json<PreviewView>, AppError> {
    let preview = assignment_service::auto(&state, payload.category, payload.full_pool).await?;
    Ok(Json(preview))
}

/// Re-shuffle the pending auto preview.
#[utoipa::path(
    post,
    path = "/assign/auto/{plan_id}/redo",
    tag = "assign",
    params(("plan_id" = String, Path, description = "Pending preview identifier")),
    responses((status = 200, description = "New preview", body = PreviewView))
)]
pub async fn redo_auto(
    State(state): State<SharedState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<PreviewView>, AppError> {
    Ok(Json(assignment_service::redo(&state, plan_id).await?))
}

/// Ask the suggestion service for ranked line-ups.
#[utoipa::path(
    post,
    path = "/assign/smart",
    tag = "assign",
    request_body = SmartAssignRequest,
    responses(
        (status = 200, description = "Preview built", body = PreviewView),
        (status = 409, description = "No free court or no usable suggestion"),
        (status = 502, description = "Suggestion service unavailable")
    )
)]
pub async fn smart_assign(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SmartAssignRequest>>,
) -> Result<Json<PreviewView>, AppError> {
    Ok(Json(assignment_service::smart(&state, payload.category).await?))
}

/// Confirm one option of the pending preview and occupy its court.
#[utoipa::path(
    post,
    path = "/assign/{plan_id}/confirm",
    tag = "assign",
    params(("plan_id" = String, Path, description = "Pending preview identifier")),
    request_body = ConfirmPlanRequest,
    responses(
        (status = 200, description = "Court occupied", body = BoardView),
        (status = 409, description = "Preview stale, mismatched or missing")
    )
)]
pub async fn confirm_plan(
    State(state): State<SharedState>,
    Path(plan_id): Path<PlanId>,
    Valid(Json(payload)): Valid<Json<ConfirmPlanRequest>>,
) -> Result<Json<BoardView>, AppError> {
    let board =
        assignment_service::confirm(&state, plan_id, payload.option, payload.start_clock).await?;
    Ok(Json(board))
}

/// Discard the pending preview.
#[utoipa::path(
    delete,
    path = "/assign/{plan_id}",
    tag = "assign",
    params(("plan_id" = String, Path, description = "Pending preview identifier")),
    responses((status = 200, description = "Preview discarded", body = BoardView))
)]
pub async fn cancel_plan(
    State(state): State<SharedState>,
    Path(plan_id): Path<PlanId>,
) -> Result<Json<BoardView>, AppError> {
    Ok(Json(assignment_service::cancel(&state, plan_id).await?))
}
