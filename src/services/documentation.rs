use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the peg board backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::sse::board_stream,
        crate::routes::board::get_board,
        crate::routes::board::get_roster,
        crate::routes::courts::create_court,
        crate::routes::courts::remove_court,
        crate::routes::courts::start_clock,
        crate::routes::courts::stop_clock,
        crate::routes::courts::set_score,
        crate::routes::courts::finish_match,
        crate::routes::courts::abandon_match,
        crate::routes::pool::add_player,
        crate::routes::pool::remove_player,
        crate::routes::pool::add_guest,
        crate::routes::pool::reorder_pool,
        crate::routes::pool::transfer,
        crate::routes::assign::auto_assign,
        crate::routes::assign::redo_auto,
        crate::routes::assign::smart_assign,
        crate::routes::assign::confirm_plan,
        crate::routes::assign::cancel_plan,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::board::BoardView,
            crate::dto::board::CourtView,
            crate::dto::board::PlayerView,
            crate::dto::board::PreviewView,
            crate::dto::board::PreviewKind,
            crate::dto::board::LineUpView,
            crate::dto::board::MatchResultView,
            crate::dto::court::ScoreDraftRequest,
            crate::dto::court::ScoreInput,
            crate::dto::court::FinishMatchRequest,
            crate::dto::court::FinishMatchResponse,
            crate::dto::court::CourtCreatedResponse,
            crate::dto::pool::AddPlayerRequest,
            crate::dto::pool::AddGuestRequest,
            crate::dto::pool::GuestCreatedResponse,
            crate::dto::pool::ReorderPoolRequest,
            crate::dto::pool::ContainerDto,
            crate::dto::pool::TransferRequest,
            crate::dto::pool::RosterEntryView,
            crate::dto::assign::AutoAssignRequest,
            crate::dto::assign::SmartAssignRequest,
            crate::dto::assign::ConfirmPlanRequest,
            crate::dto::sse::Handshake,
            crate::dto::sse::SystemStatus,
            crate::dto::sse::ClockTickEvent,
            crate::dto::sse::NoticeEvent,
            crate::state::assignment::Category,
            crate::state::pool::Gender,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "sse", description = "Server-sent events stream"),
        (name = "board", description = "Board and roster views"),
        (name = "courts", description = "Courts, clocks and match outcomes"),
        (name = "pool", description = "Waiting pool and player transfers"),
        (name = "assign", description = "Auto and smart assignment previews"),
    )
)]
pub struct ApiDoc;
