use anyhow::{Context, Result};
use redis::aio::ConnectionManager;

/// Cheap to clone; reconnects on its own after a dropped connection.
pub type RedisPool = ConnectionManager;

pub async fn establish_connection(redis_url: &str) -> Result<RedisPool> {
    let client = redis::Client::open(redis_url).context("invalid REDIS_URL")?;
    let manager = ConnectionManager::new(client)
        .await
        .context("failed to connect to redis")?;
    Ok(manager)
}
