use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

/// Cancellation handle for the live call under one logical operation key.
pub struct PendingRequestHandle {
    key: String,
    generation: u64,
    cancelled: oneshot::Receiver<()>,
}

impl PendingRequestHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolves once a newer call supersedes this one. Never resolves if the
    /// handle is retired without being superseded.
    pub async fn cancelled(&mut self) {
        if (&mut self.cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

struct Live {
    generation: u64,
    cancel: oneshot::Sender<()>,
}

/// Tracks at most one live handle per operation key.
#[derive(Default)]
pub struct InflightRegistry {
    next_generation: AtomicU64,
    live: Mutex<HashMap<String, Live>>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a handle for `key`, cancelling whichever handle was live.
    pub fn begin(&self, key: &str) -> PendingRequestHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = oneshot::channel();
        let previous = self.lock().insert(
            key.to_string(),
            Live {
                generation,
                cancel: tx,
            },
        );
        if let Some(prev) = previous {
            tracing::debug!(key, superseded = prev.generation, "superseding in-flight request");
            let _ = prev.cancel.send(());
        }
        PendingRequestHandle {
            key: key.to_string(),
            generation,
            cancelled: rx,
        }
    }

    pub fn is_current(&self, handle: &PendingRequestHandle) -> bool {
        self.lock()
            .get(&handle.key)
            .is_some_and(|l| l.generation == handle.generation)
    }

    /// Retires `handle`. Returns false when it was superseded meanwhile, in
    /// which case its result must be dropped.
    pub fn finish(&self, handle: &PendingRequestHandle) -> bool {
        let mut live = self.lock();
        match live.get(&handle.key) {
            Some(l) if l.generation == handle.generation => {
                live.remove(&handle.key);
                true
            }
            _ => false,
        }
    }

    /// Cancels the live call under `key`, if any.
    pub fn cancel(&self, key: &str) -> bool {
        match self.lock().remove(key) {
            Some(l) => {
                let _ = l.cancel.send(());
                true
            }
            None => false,
        }
    }

    pub fn live_keys(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Live>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "../tests/remote/supersede_tests.rs"]
mod tests;
