use std::convert::Infallible;

use axum::{Router, extract::State, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse",
    tag = "sse",
    responses((
        status = 200,
        description = "Board event stream: board.updated, clock.tick, match.finalized, notice",
        content_type = "text/event-stream",
        body = String
    ))
)]
/// Stream board changes and clock ticks to connected screens.
pub async fn board_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    let receiver = sse_service::subscribe(&state);
    let initial = sse_service::initial_events(&state).await;
    info!(subscribers = state.sse().subscriber_count(), "new board SSE connection");
    sse_service::to_sse_stream(initial, receiver)
}

/// Configure the SSE endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse", get(board_stream))
}
