//! Application services sitting between the routes and the board state.

/// Auto and smart assignment previews.
pub mod assignment_service;
/// Attendance reporting and its de-duplication cache.
pub mod attendance_notifier;
/// Board mutations and their mirroring.
pub mod board_service;
/// Per-court match clock tasks.
pub mod clock_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Daily rollover and snapshot purge.
pub mod housekeeping;
/// Session restore and day rollover.
pub mod session_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming.
pub mod sse_service;
/// Snapshot store connection supervisor.
pub mod storage_supervisor;
