use uuid::Uuid;

use crate::{
    entities::{subscription_orders::SubscriptionOrderEntity, subscriptions::SubscriptionEntity},
    value_objects::enums::subscription_actions::SubscriptionAction,
};

/// Result of applying a payment-success callback inside one transaction.
/// Only `Applied` means rows were written.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentApplication {
    OrderNotFound,
    PlanNotFound { plan_id: Uuid },
    AlreadyPaid(SubscriptionOrderEntity),
    Applied(AppliedPayment),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPayment {
    pub order: SubscriptionOrderEntity,
    pub subscription: SubscriptionEntity,
    pub plan_name: String,
    pub action: SubscriptionAction,
}
