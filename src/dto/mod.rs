//! Request, response and event payloads exchanged with screens.

pub mod assign;
pub mod board;
pub mod court;
pub mod health;
pub mod pool;
pub mod sse;
pub mod validation;
