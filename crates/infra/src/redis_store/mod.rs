pub mod cached_subscriptions;
pub mod distributed_lock;
pub mod redis_connection;
pub mod subscription_cache;
