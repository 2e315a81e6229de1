pub mod distributed_lock;
pub mod passport;
pub mod payment_gateway;
