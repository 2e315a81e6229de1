use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;
use redis::AsyncCommands;
use std::time::Duration;
use uuid::Uuid;

use domain::entities::subscriptions::SubscriptionEntity;

use crate::redis_store::redis_connection::RedisPool;

pub const POSITIVE_TTL: Duration = Duration::from_secs(60 * 60);
pub const MAX_TTL_JITTER_SECS: u64 = 600;
pub const NEGATIVE_TTL: Duration = Duration::from_secs(5 * 60);
const NULL_SENTINEL: &str = "null";

pub fn cache_key(user_id: Uuid) -> String {
    format!("subscription:user:{}", user_id)
}

/// What the cache knows about a user.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedSubscription {
    Miss,
    /// A recent lookup found no row.
    Absent,
    Present(SubscriptionEntity),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionCache: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<CachedSubscription>;
    async fn put(&self, user_id: Uuid, subscription: Option<SubscriptionEntity>) -> Result<()>;
    async fn invalidate(&self, user_id: Uuid) -> Result<()>;
}

pub struct RedisSubscriptionCache {
    connection: RedisPool,
}

impl RedisSubscriptionCache {
    pub fn new(connection: RedisPool) -> Self {
        Self { connection }
    }
}

fn positive_ttl_secs() -> u64 {
    POSITIVE_TTL.as_secs() + rand::thread_rng().gen_range(0..MAX_TTL_JITTER_SECS)
}

fn decode(raw: Option<String>) -> Result<CachedSubscription> {
    match raw.as_deref() {
        None => Ok(CachedSubscription::Miss),
        Some(NULL_SENTINEL) => Ok(CachedSubscription::Absent),
        Some(json) => Ok(CachedSubscription::Present(serde_json::from_str(json)?)),
    }
}

#[async_trait]
impl SubscriptionCache for RedisSubscriptionCache {
    async fn get(&self, user_id: Uuid) -> Result<CachedSubscription> {
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn.get(cache_key(user_id)).await?;

        decode(raw)
    }

    async fn put(&self, user_id: Uuid, subscription: Option<SubscriptionEntity>) -> Result<()> {
        let mut conn = self.connection.clone();

        let (value, ttl) = match subscription {
            Some(subscription) => (serde_json::to_string(&subscription)?, positive_ttl_secs()),
            None => (NULL_SENTINEL.to_string(), NEGATIVE_TTL.as_secs()),
        };
        let _: () = conn.set_ex(cache_key(user_id), value, ttl).await?;

        Ok(())
    }

    async fn invalidate(&self, user_id: Uuid) -> Result<()> {
        let mut conn = self.connection.clone();

        let _: () = conn.del(cache_key(user_id)).await?;

        Ok(())
    }
}
