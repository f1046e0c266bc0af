// Per-file write locks
// One registry per store; keys are day-file paths, waiters are served FIFO

use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio::time::Instant;

pub const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

struct LockSlot {
    mutex: Arc<AsyncMutex<()>>,
    heldSince: Mutex<Option<Instant>>,
}

impl LockSlot {
    fn new() -> Self {
        Self {
            mutex: Arc::new(AsyncMutex::new(())),
            heldSince: Mutex::new(None),
        }
    }
}

/// Registry of in-flight write locks, keyed by file path
///
/// Holding a [`FileLockGuard`] grants exclusive write access to its path within
/// this process. A holder that keeps a key longer than the timeout is treated
/// as stalled: the next waiter evicts it and proceeds, and the stalled holder
/// may still be running.
pub struct LockRegistry {
    slots: Mutex<HashMap<PathBuf, Arc<LockSlot>>>,
    timeout: Duration,
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new(LOCK_TIMEOUT)
    }
}

impl LockRegistry {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            timeout,
        }
    }

    fn slot(&self, key: &Path) -> Arc<LockSlot> {
        self.slots
            .lock()
            .entry(key.to_path_buf())
            .or_insert_with(|| Arc::new(LockSlot::new()))
            .clone()
    }

    fn isCurrent(&self, key: &Path, slot: &Arc<LockSlot>) -> bool {
        self.slots
            .lock()
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    /// When the current holder of `slot` goes stale; a free slot is re-checked after a full timeout
    fn staleAt(&self, slot: &LockSlot) -> Instant {
        let heldSince = *slot.heldSince.lock();
        heldSince
            .map(|since| since + self.timeout)
            .unwrap_or_else(|| Instant::now() + self.timeout)
    }

    fn isStalled(&self, slot: &LockSlot) -> bool {
        let heldSince = *slot.heldSince.lock();
        heldSince.is_some_and(|since| since.elapsed() >= self.timeout)
    }

    /// Replace a stalled slot so new waiters queue on a fresh mutex
    fn evict(&self, key: &Path, stale: &Arc<LockSlot>) {
        let mut slots = self.slots.lock();
        if slots.get(key).is_some_and(|current| Arc::ptr_eq(current, stale)) {
            slots.insert(key.to_path_buf(), Arc::new(LockSlot::new()));
            tracing::warn!(
                "[LockRegistry::acquire] Lock on {} held longer than {:?}, forcing release",
                key.display(),
                self.timeout
            );
        }
    }

    /// Wait until `key` is free and take it
    pub async fn acquire(&self, key: &Path) -> FileLockGuard<'_> {
        loop {
            let waiter = Waiter {
                registry: self,
                key,
                slot: self.slot(key),
            };
            let lockFuture = waiter.slot.mutex.clone().lock_owned();
            tokio::pin!(lockFuture);

            // Stay queued across holders; only a stalled holder sends us to a fresh slot
            let acquired = loop {
                let staleAt = self.staleAt(&waiter.slot);
                tokio::select! {
                    guard = &mut lockFuture => break Some(guard),
                    _ = tokio::time::sleep_until(staleAt) => {
                        if self.isStalled(&waiter.slot) {
                            self.evict(key, &waiter.slot);
                            break None;
                        }
                    }
                }
            };

            let Some(guard) = acquired else {
                continue;
            };
            // Slot was evicted while we queued on it; requeue on the live one
            if !self.isCurrent(key, &waiter.slot) {
                drop(guard);
                continue;
            }
            *waiter.slot.heldSince.lock() = Some(Instant::now());
            return FileLockGuard {
                registry: self,
                key: key.to_path_buf(),
                slot: waiter.slot.clone(),
                guard: Some(guard),
            };
        }
    }
}

/// Forget `key` when `slot` is live and nobody but the registry and one owner holds it
fn forgetIfIdle(slots: &mut HashMap<PathBuf, Arc<LockSlot>>, key: &Path, slot: &Arc<LockSlot>) {
    let idle = slots
        .get(key)
        .is_some_and(|current| Arc::ptr_eq(current, slot) && Arc::strong_count(slot) == 2);
    if idle {
        slots.remove(key);
    }
}

/// A queued acquire; dropping it (cancelled or requeued) cleans up an idle key
struct Waiter<'a> {
    registry: &'a LockRegistry,
    key: &'a Path,
    slot: Arc<LockSlot>,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        let mut slots = self.registry.slots.lock();
        forgetIfIdle(&mut slots, self.key, &self.slot);
    }
}

/// Exclusive write access to one path, released on drop
pub struct FileLockGuard<'a> {
    registry: &'a LockRegistry,
    key: PathBuf,
    slot: Arc<LockSlot>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl FileLockGuard<'_> {
    pub fn key(&self) -> &Path {
        &self.key
    }

    /// Explicit release, same as dropping the guard
    pub fn release(self) {}
}

impl Drop for FileLockGuard<'_> {
    fn drop(&mut self) {
        *self.slot.heldSince.lock() = None;

        let mut slots = self.registry.slots.lock();
        // Hand the mutex to the next waiter
        drop(self.guard.take());
        forgetIfIdle(&mut slots, &self.key, &self.slot);
    }
}
