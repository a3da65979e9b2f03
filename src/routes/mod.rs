//! HTTP surface of the peg board.

use axum::Router;

use crate::state::SharedState;

/// Auto and smart assignment previews.
pub mod assign;
/// Board snapshot and roster.
pub mod board;
/// Court lifecycle, clocks and scores.
pub mod courts;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Pool membership, guests and transfers.
pub mod pool;
/// Server-sent event stream.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(board::router())
        .merge(courts::router())
        .merge(pool::router())
        .merge(assign::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
