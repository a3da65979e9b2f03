//! Cancellable periodic tasks keyed by an identifier.

use std::{future::Future, hash::Hash, time::Duration};

use dashmap::DashMap;
use tokio::{
    task::AbortHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};

/// Keyed registry of cancellable periodic tasks.
///
/// At most one task runs per key; spawning again replaces (and aborts) the previous one.
pub struct TaskRegistry<K>
where
    K: Eq + Hash,
{
    tasks: DashMap<K, AbortHandle>,
}

impl<K> Default for TaskRegistry<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }
}

impl<K> TaskRegistry<K>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Registry without tasks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `step` every `period`, first after one full period, until it returns `false`.
    pub fn spawn_periodic<F, Fut>(&self, key: K, period: Duration, mut step: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                interval.tick().await;
                if !step().await {
                    break;
                }
            }
        })
        .abort_handle();

        if let Some(previous) = self.tasks.insert(key, handle) {
            previous.abort();
        }
    }

    /// Abort the task registered under `key`. Returns `false` when none was active.
    pub fn cancel(&self, key: &K) -> bool {
        match self.tasks.remove(key) {
            Some((_, handle)) => {
                let active = !handle.is_finished();
                handle.abort();
                active
            }
            None => false,
        }
    }

    /// Whether a task for `key` is still running.
    pub fn is_active(&self, key: &K) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Abort every registered task.
    pub fn cancel_all(&self) {
        self.tasks.retain(|_, handle| {
            handle.abort();
            false
        });
    }
}
