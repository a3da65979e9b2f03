//! Auto and smart assignment previews and their confirmation.

use tracing::{info, warn};

use crate::{
    dto::board::{BoardView, PreviewView},
    error::ServiceError,
    integrations::models::{SuggestionCourt, SuggestionPlayer, SuggestionRequest},
    services::{board_service::mutate, sse_events},
    state::{
        NoticeKind, SharedState,
        assignment::{Category, PlanId, SuggestedGrouping},
        session::now_ms,
    },
};

/// Draw a random preview for the first free court.
pub async fn auto(
    state: &SharedState,
    category: Category,
    full_pool: bool,
) -> Result<PreviewView, ServiceError> {
    let (plan, _) = mutate(state, |board| {
        board.plan_auto(category, full_pool, &mut rand::rng())
    })
    .await?;
    info!(plan_id = %plan.id, court_no = plan.court_no, %category, "auto preview drawn");
    Ok(PreviewView::from(&plan))
}

/// Re-shuffle the pending auto preview.
pub async fn redo(state: &SharedState, plan_id: PlanId) -> Result<PreviewView, ServiceError> {
    let (plan, _) = mutate(state, |board| board.redo_auto(plan_id, &mut rand::rng())).await?;
    Ok(PreviewView::from(&plan))
}

/// Ask the suggestion collaborator for ranked line-ups and keep the usable ones as a preview.
pub async fn smart(state: &SharedState, category: Category) -> Result<PreviewView, ServiceError> {
    let request = {
        let board = state.board().read().await;
        board.smart_target()?;
        SuggestionRequest {
            club_id: board.session().club_id().to_string(),
            pool: board.pool().iter().map(SuggestionPlayer::from).collect(),
            courts: board
                .courts()
                .iter()
                .map(|court| SuggestionCourt {
                    court_no: court.court_no(),
                    player_ids: court
                        .slots()
                        .iter()
                        .map(|slot| slot.as_ref().map(|p| p.id.clone()))
                        .collect(),
                })
                .collect(),
            category,
        }
    };

    let options = match state.integrations().suggestions.suggest(request).await {
        Ok(options) => options,
        Err(err) => {
            warn!(%category, error = %err, "suggestion request failed");
            sse_events::broadcast_notice(
                state,
                NoticeKind::Suggestions,
                "Smart suggestions are currently unavailable",
            );
            return Err(err.into());
        }
    };
    let received = options.len();
    let groupings: Vec<SuggestedGrouping> = options.into_iter().map(Into::into).collect();

    let (plan, _) = mutate(state, |board| board.plan_smart(category, groupings)).await?;
    info!(
        plan_id = %plan.id,
        court_no = plan.court_no,
        received,
        usable = plan.options.len(),
        "smart preview built"
    );
    Ok(PreviewView::from(&plan))
}

/// Perform the transfers of one preview option.
pub async fn confirm(
    state: &SharedState,
    plan_id: PlanId,
    option: usize,
    start_clock: bool,
) -> Result<BoardView, ServiceError> {
    let now = now_ms();
    let (court_no, view) = mutate(state, |board| {
        board.confirm_plan(plan_id, option, start_clock, now)
    })
    .await?;
    info!(%plan_id, court_no, start_clock, "assignment confirmed");
    Ok(view)
}

/// Discard the pending preview.
pub async fn cancel(state: &SharedState, plan_id: PlanId) -> Result<BoardView, ServiceError> {
    let (_, view) = mutate(state, |board| Ok(((), board.cancel_plan(plan_id)?))).await?;
    Ok(view)
}
