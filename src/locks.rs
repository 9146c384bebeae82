//! Per-contract exclusive sections.
//!
//! Balance checks, schedule rebuilds and availability flips are
//! read-then-write sequences, so every mutation of a contract runs while
//! holding that contract's lock. Operations that touch staff bookings also
//! take the staffing lock first, since exclusivity spans contracts.
//!
//! The locks live in process memory: they serialize writers within one
//! service instance only. Run a single instance against a given database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

type LockMap = Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>;

#[derive(Clone, Default)]
pub struct ContractLocks {
    contracts: LockMap,
    staffing: Arc<AsyncMutex<()>>,
    sequence: Arc<AsyncMutex<()>>,
}

/// Held lock on one contract; released (and pruned) on drop
pub struct ContractGuard {
    id: Uuid,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
    map: LockMap,
}

impl Drop for ContractGuard {
    fn drop(&mut self) {
        self.guard.take();
        let mut map = self.map.lock().unwrap_or_else(PoisonError::into_inner);
        // map + this guard hold the only references
        if Arc::strong_count(&self.lock) == 2 {
            if let Some(existing) = map.get(&self.id) {
                if Arc::ptr_eq(existing, &self.lock) {
                    map.remove(&self.id);
                }
            }
        }
    }
}

impl ContractLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, id: Uuid) -> ContractGuard {
        let lock = {
            let mut map = self.contracts.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = lock.clone().lock_owned().await;
        ContractGuard {
            id,
            lock,
            guard: Some(guard),
            map: self.contracts.clone(),
        }
    }

    /// Lock several contracts in id order so concurrent callers cannot deadlock.
    pub async fn acquire_all(&self, ids: &[Uuid]) -> Vec<ContractGuard> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await);
        }
        guards
    }

    /// Serializes booking mutations across all contracts.
    ///
    /// Always taken before any contract lock.
    pub async fn staffing(&self) -> OwnedMutexGuard<()> {
        self.staffing.clone().lock_owned().await
    }

    /// Serializes contract code allocation
    pub async fn sequence(&self) -> OwnedMutexGuard<()> {
        self.sequence.clone().lock_owned().await
    }

    /// Number of contracts with a live lock entry
    pub fn tracked(&self) -> usize {
        self.contracts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
