use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use application::interfaces::distributed_lock::{DistributedLock, LockHandle};

use crate::redis_store::redis_connection::RedisPool;

/// Deletes the key only while it still holds our token.
const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

pub struct RedisDistributedLock {
    connection: RedisPool,
}

impl RedisDistributedLock {
    pub fn new(connection: RedisPool) -> Self {
        Self { connection }
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl DistributedLock for RedisDistributedLock {
    async fn try_acquire(&self, key: String, ttl: Duration) -> Result<Option<LockHandle>> {
        let mut conn = self.connection.clone();
        let token = Uuid::new_v4().to_string();

        let reply: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(&token)
            .arg("NX")
            .arg("PX")
            .arg(ttl_millis(ttl))
            .query_async(&mut conn)
            .await?;

        match reply {
            Some(_) => Ok(Some(LockHandle { key, token })),
            None => {
                debug!(%key, "lock: already held");
                Ok(None)
            }
        }
    }

    async fn release(&self, handle: LockHandle) -> Result<()> {
        let mut conn = self.connection.clone();

        let deleted: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(&handle.key)
            .arg(&handle.token)
            .invoke_async(&mut conn)
            .await?;

        if deleted == 0 {
            debug!(key = %handle.key, "lock: expired before release");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_sent_in_milliseconds() {
        assert_eq!(ttl_millis(Duration::from_secs(600)), 600_000);
        assert_eq!(ttl_millis(Duration::ZERO), 1);
    }
}
