pub mod enums;
pub mod pagination;
pub mod payments;
pub mod plans;
pub mod regions;
pub mod subscription_lifecycle;
pub mod subscriptions;
