//! In-process snapshot store.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;

use crate::dao::{
    models::{
        CourtKey, CourtSnapshotEntity, NotifiedSnapshotEntity, PoolSnapshotEntity, RawSnapshot,
        is_stale,
    },
    storage::{StorageError, StorageResult},
};

use super::{SnapshotStore, court_doc_id, court_prefix, notified_doc_id, pool_doc_id};

/// Process-local snapshot store used when no CouchDB is configured, and in tests.
#[derive(Clone, Default)]
pub struct MemorySnapshotStore {
    documents: Arc<DashMap<String, Value>>,
}

impl MemorySnapshotStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document as-is, bypassing the typed entities.
    pub fn insert_raw(&self, doc_id: impl Into<String>, value: Value) {
        self.documents.insert(doc_id.into(), value);
    }

    /// Stored body of `doc_id`, if any.
    pub fn get_raw(&self, doc_id: &str) -> Option<Value> {
        self.documents.get(doc_id).map(|entry| entry.value().clone())
    }

    /// Stored document ids, sorted.
    pub fn doc_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.documents.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    fn put<T: Serialize>(&self, doc_id: String, entity: &T) -> StorageResult<()> {
        let value = serde_json::to_value(entity)
            .map_err(|err| StorageError::unavailable(format!("encode {doc_id}"), err))?;
        self.documents.insert(doc_id, value);
        Ok(())
    }

    fn find(&self, doc_id: &str) -> Option<RawSnapshot> {
        self.get_raw(doc_id).map(|value| RawSnapshot {
            key: doc_id.to_string(),
            value,
        })
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn put_court(&self, snapshot: CourtSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.put(court_doc_id(&snapshot.key()), &snapshot);
        Box::pin(async move { result })
    }

    fn delete_court(&self, key: CourtKey) -> BoxFuture<'static, StorageResult<()>> {
        self.documents.remove(&court_doc_id(&key));
        Box::pin(async { Ok(()) })
    }

    fn list_courts(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Vec<RawSnapshot>>> {
        let prefix = court_prefix(&club_id, &date);
        let mut entries: Vec<RawSnapshot> = self
            .documents
            .iter()
            .filter(|entry| entry.key().starts_with(&prefix))
            .map(|entry| RawSnapshot {
                key: entry.key().clone(),
                value: entry.value().clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Box::pin(async move { Ok(entries) })
    }

    fn put_pool(&self, pool: PoolSnapshotEntity) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.put(pool_doc_id(&pool.club_id, &pool.date), &pool);
        Box::pin(async move { result })
    }

    fn find_pool(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>> {
        let found = self.find(&pool_doc_id(&club_id, &date));
        Box::pin(async move { Ok(found) })
    }

    fn put_notified(
        &self,
        notified: NotifiedSnapshotEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let result = self.put(notified_doc_id(&notified.club_id, &notified.date), &notified);
        Box::pin(async move { result })
    }

    fn find_notified(
        &self,
        club_id: String,
        date: String,
    ) -> BoxFuture<'static, StorageResult<Option<RawSnapshot>>> {
        let found = self.find(&notified_doc_id(&club_id, &date));
        Box::pin(async move { Ok(found) })
    }

    fn purge_stale(&self, today: String) -> BoxFuture<'static, StorageResult<usize>> {
        // Writers may insert concurrently, so count what retain drops.
        let mut purged = 0;
        self.documents.retain(|_, value| {
            let stale = is_stale(value, &today);
            purged += usize::from(stale);
            !stale
        });
        Box::pin(async move { Ok(purged) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn court(date: &str, court_no: u32) -> CourtSnapshotEntity {
        CourtSnapshotEntity {
            club_id: "club".into(),
            date: date.into(),
            court_no,
            assigned: vec![None; 4],
            is_running: true,
            started_at: Some(0),
            last_elapsed_ms: 0,
            score: String::new(),
            category: None,
        }
    }

    #[tokio::test]
    async fn list_is_scoped_to_club_and_date() {
        let store = MemorySnapshotStore::new();
        store.put_court(court("2024-05-01", 1)).await.unwrap();
        store.put_court(court("2024-05-01", 2)).await.unwrap();
        store.put_court(court("2024-04-30", 1)).await.unwrap();

        let listed = store
            .list_courts("club".into(), "2024-05-01".into())
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);

        store.delete_court(court("2024-05-01", 2).key()).await.unwrap();
        let listed = store
            .list_courts("club".into(), "2024-05-01".into())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn purge_keeps_only_today() {
        let store = MemorySnapshotStore::new();
        store.put_court(court("2024-05-01", 1)).await.unwrap();
        store.put_court(court("2024-04-30", 1)).await.unwrap();
        store.insert_raw("court::club:junk:9", json!({"garbage": true}));

        let purged = store.purge_stale("2024-05-01".into()).await.unwrap();
        assert_eq!(purged, 2);
        assert_eq!(store.doc_ids(), vec!["court::club:2024-05-01:1"]);
    }

    #[tokio::test]
    async fn purge_counts_only_what_it_removed_under_concurrent_writes() {
        let store = MemorySnapshotStore::new();
        for court_no in 1..=50 {
            store.put_court(court("2024-04-30", court_no)).await.unwrap();
        }

        let writer = store.clone();
        let purge = std::thread::scope(|scope| {
            scope.spawn(move || {
                for court_no in 1..=500 {
                    writer.insert_raw(
                        format!("court::club:2024-05-01:{court_no}"),
                        json!({"clubId": "club", "date": "2024-05-01", "courtNo": court_no}),
                    );
                }
            });
            store.purge_stale("2024-05-01".into())
        });

        assert_eq!(purge.await.unwrap(), 50);
        assert_eq!(store.doc_ids().len(), 500);
    }
}
