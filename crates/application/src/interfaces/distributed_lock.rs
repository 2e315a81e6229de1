use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Proof of ownership returned by a successful acquire; `token` guards against releasing a lock
/// that expired and was taken by someone else.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockHandle {
    pub key: String,
    pub token: String,
}

/// Single-attempt, non-blocking, TTL-bounded mutual exclusion.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// `Ok(None)` when the key is already held.
    async fn try_acquire(&self, key: String, ttl: Duration) -> Result<Option<LockHandle>>;
    async fn release(&self, handle: LockHandle) -> Result<()>;
}
