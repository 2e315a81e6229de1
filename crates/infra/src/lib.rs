pub mod clients;
pub mod observability;
pub mod postgres;
pub mod redis_store;
