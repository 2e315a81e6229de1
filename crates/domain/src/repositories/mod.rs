pub mod plan_pricings;
pub mod plans;
pub mod subscription_histories;
pub mod subscription_orders;
pub mod subscriptions;
