//! Payloads streamed over server-sent events.

use serde::Serialize;
use utoipa::ToSchema;

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    /// SSE event name; `None` sends an unnamed message.
    pub event: Option<String>,
    /// JSON-encoded payload.
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without its snapshot store.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    /// Whether the snapshot store is unavailable.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast every second for each running court.
pub struct ClockTickEvent {
    /// Ticking court.
    pub court_no: u32,
    /// Elapsed match time in milliseconds.
    pub elapsed_ms: u64,
    /// `MM:SS`.
    pub elapsed: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// Collaborator failure surfaced once per session.
pub struct NoticeEvent {
    /// Failing collaborator: `attendance`, `match_history`, `roster` or `suggestions`.
    pub kind: String,
    /// Text shown to the operator.
    pub message: String,
}
