//! Snapshot store abstraction, document ids and the ordered writer.

#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
pub mod writer;

use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    models::{
        CourtKey, CourtSnapshotEntity, NotifiedSnapshotEntity, PoolSnapshotEntity, RawSnapshot,
    },
    storage::StorageResult,
};

/// Namespace of court documents.
pub const COURT_PREFIX: &str = "court::";
/// Namespace of pool documents.
pub const POOL_PREFIX: &str = "pool::";
/// Namespace of the reported-present cache.
pub const NOTIFIED_PREFIX: &str = "notified::";

/// Durable mirror of the live session, keyed by club and date.
///
/// Listing returns undecoded documents so callers can skip corrupt entries one by one.
pub trait SnapshotStore: Send + Sync {
    /// Upsert the snapshot of one court.
    fn put_court(&self, snapshot: CourtSnapshotEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Delete a court snapshot; missing documents are not an error.
    fn delete_court(&self, key: CourtKey) -> BoxFuture<'static, StorageResult<()>>;
    /// Every court snapshot of one session.
    fn list_courts(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RawSnapshot>>>;
    /// Upsert the pool snapshot.
    fn put_pool(&self, pool: PoolSnapshotEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Pool snapshot of one session, if written.
    fn find_pool(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>>;
    /// Upsert the reported-present cache.
    fn put_notified(
        &self,
        notified: NotifiedSnapshotEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Reported-present cache of one session, if written.
    fn find_notified(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>>;
    /// Delete every snapshot dated other than `today`; returns how many were removed.
    fn purge_stale(&self, today: String) -> BoxFuture<'static, StorageResult<usize>>;
    /// Cheap liveness check.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Slot holding the installed store; empty while degraded.
pub type StoreSlot = Arc<RwLock<Option<Arc<dyn SnapshotStore>>>>;

/// Document id of a court snapshot.
pub fn court_doc_id(key: &CourtKey) -> String {
    format!("{COURT_PREFIX}{key}")
}

/// Prefix shared by every court document of one session.
pub fn court_prefix(club_id: &str, date: &str) -> String {
    format!("{COURT_PREFIX}{club_id}:{date}:")
}

/// Document id of a pool snapshot.
pub fn pool_doc_id(club_id: &str, date: &str) -> String {
    format!("{POOL_PREFIX}{club_id}:{date}")
}

/// Document id of a reported-present cache.
pub fn notified_doc_id(club_id: &str, date: &str) -> String {
    format!("{NOTIFIED_PREFIX}{club_id}:{date}")
}

/// Whether a document id belongs to the snapshot namespaces.
pub fn is_snapshot_doc(doc_id: &str) -> bool {
    [COURT_PREFIX, POOL_PREFIX, NOTIFIED_PREFIX]
        .iter()
        .any(|prefix| doc_id.starts_with(prefix))
}
