//! Per-pool leases for serializing workflows that share an allowance.
//!
//! Two workflows that top up the same pool concurrently can both read the
//! old allowance and over- or under-approve. Acquire the pool's lease
//! before building the queue and hand it to [`StepQueue::hold`] so it is
//! released once the queue has run.
//!
//! [`StepQueue::hold`]: crate::StepQueue::hold

use std::fmt;
use std::sync::Arc;

use tcrflow_core::AllowancePool;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Exclusive access to one allowance pool.
pub struct PoolLease {
    pool: AllowancePool,
    _guard: OwnedMutexGuard<()>,
}

impl PoolLease {
    /// The leased pool.
    pub fn pool(&self) -> AllowancePool {
        self.pool
    }
}

impl fmt::Debug for PoolLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolLease").field("pool", &self.pool).finish()
    }
}

/// One lock per allowance pool. Clones share the same locks.
#[derive(Debug, Clone, Default)]
pub struct PoolLeases {
    registry: Arc<Mutex<()>>,
    voting: Arc<Mutex<()>>,
    parameterizer: Arc<Mutex<()>>,
}

impl PoolLeases {
    /// Creates an unlocked set of leases.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, pool: AllowancePool) -> Arc<Mutex<()>> {
        match pool {
            AllowancePool::Registry => Arc::clone(&self.registry),
            AllowancePool::Voting => Arc::clone(&self.voting),
            AllowancePool::Parameterizer => Arc::clone(&self.parameterizer),
        }
    }

    /// Waits until `pool` is free and leases it.
    pub async fn acquire(&self, pool: AllowancePool) -> PoolLease {
        let guard = self.lock_for(pool).lock_owned().await;
        debug!(%pool, "Pool lease acquired");
        PoolLease {
            pool,
            _guard: guard,
        }
    }

    /// Leases `pool` if no one else holds it.
    pub fn try_acquire(&self, pool: AllowancePool) -> Option<PoolLease> {
        self.lock_for(pool)
            .try_lock_owned()
            .ok()
            .map(|guard| PoolLease {
                pool,
                _guard: guard,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::StepQueue;

    #[tokio::test]
    async fn test_lease_is_exclusive_per_pool() {
        let leases = PoolLeases::new();
        let lease = leases.acquire(AllowancePool::Registry).await;
        assert_eq!(lease.pool(), AllowancePool::Registry);

        assert!(leases.try_acquire(AllowancePool::Registry).is_none());
        assert!(leases.try_acquire(AllowancePool::Voting).is_some());

        drop(lease);
        assert!(leases.try_acquire(AllowancePool::Registry).is_some());
    }

    #[tokio::test]
    async fn test_clones_share_locks() {
        let leases = PoolLeases::new();
        let other = leases.clone();
        let _lease = leases.acquire(AllowancePool::Parameterizer).await;
        assert!(other.try_acquire(AllowancePool::Parameterizer).is_none());
    }

    #[tokio::test]
    async fn test_queue_releases_lease_after_run() {
        let leases = PoolLeases::new();
        let mut queue = StepQueue::new();
        queue.hold(leases.acquire(AllowancePool::Voting).await);
        assert!(leases.try_acquire(AllowancePool::Voting).is_none());

        queue.run().await.unwrap();
        assert!(leases.try_acquire(AllowancePool::Voting).is_some());
    }
}
