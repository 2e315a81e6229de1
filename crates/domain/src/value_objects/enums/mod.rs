pub mod payment_statuses;
pub mod subscription_actions;
pub mod subscription_statuses;
