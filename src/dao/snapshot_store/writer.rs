//! Single ordered consumer of snapshot writes.
//!
//! Board mutations enqueue writes while they still hold the board lock, so the queue
//! order is the mutation order. Failures are logged and never fed back to the board.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::dao::{
    models::{CourtKey, CourtSnapshotEntity, NotifiedSnapshotEntity, PoolSnapshotEntity},
    storage::StorageResult,
};

use super::{SnapshotStore, StoreSlot};

/// One write against the session store.
#[derive(Debug)]
pub enum SnapshotWrite {
    /// Upsert a court.
    PutCourt(CourtSnapshotEntity),
    /// Delete a court that became empty and idle.
    DeleteCourt(CourtKey),
    /// Upsert the pool.
    PutPool(PoolSnapshotEntity),
    /// Upsert the reported-present cache.
    PutNotified(NotifiedSnapshotEntity),
    /// Acknowledged once every earlier write has been attempted.
    Flush(oneshot::Sender<()>),
}

/// Handle used to enqueue writes; cloning shares the same queue.
#[derive(Clone)]
pub struct SnapshotWriter {
    tx: mpsc::UnboundedSender<SnapshotWrite>,
}

impl SnapshotWriter {
    /// Spawn the writer task against whatever store is installed in `slot`.
    pub fn spawn(slot: StoreSlot) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(rx, slot));
        Self { tx }
    }

    /// Queue a write; never blocks.
    pub fn enqueue(&self, write: SnapshotWrite) {
        if self.tx.send(write).is_err() {
            warn!("snapshot writer stopped; dropping write");
        }
    }

    /// Wait until every write enqueued so far has been attempted.
    pub async fn flush(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.enqueue(SnapshotWrite::Flush(ack_tx));
        let _ = ack_rx.await;
    }
}

async fn run(mut rx: mpsc::UnboundedReceiver<SnapshotWrite>, slot: StoreSlot) {
    while let Some(write) = rx.recv().await {
        if let SnapshotWrite::Flush(ack) = write {
            let _ = ack.send(());
            continue;
        }

        let store = slot.read().await.clone();
        let Some(store) = store else {
            debug!(write = describe(&write), "snapshot store unavailable; skipping write");
            continue;
        };

        let label = describe(&write);
        if let Err(err) = apply(store.as_ref(), write).await {
            warn!(write = label, error = %err, "snapshot write failed");
        }
    }
}

async fn apply(store: &dyn SnapshotStore, write: SnapshotWrite) -> StorageResult<()> {
    match write {
        SnapshotWrite::PutCourt(snapshot) => store.put_court(snapshot).await,
        SnapshotWrite::DeleteCourt(key) => store.delete_court(key).await,
        SnapshotWrite::PutPool(pool) => store.put_pool(pool).await,
        SnapshotWrite::PutNotified(notified) => store.put_notified(notified).await,
        SnapshotWrite::Flush(ack) => {
            let _ = ack.send(());
            Ok(())
        }
    }
}

fn describe(write: &SnapshotWrite) -> &'static str {
    match write {
        SnapshotWrite::PutCourt(_) => "put_court",
        SnapshotWrite::DeleteCourt(_) => "delete_court",
        SnapshotWrite::PutPool(_) => "put_pool",
        SnapshotWrite::PutNotified(_) => "put_notified",
        SnapshotWrite::Flush(_) => "flush",
    }
}
