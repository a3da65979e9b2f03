//! Persistence layer: snapshot entities, stores and storage errors.

pub mod models;
pub mod snapshot_store;
pub mod storage;
