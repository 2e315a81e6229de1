use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::{schema::subscription_orders, value_objects::enums::payment_statuses::PaymentStatus};

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscription_orders, primary_key(order_id))]
pub struct SubscriptionOrderEntity {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub app_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionOrderEntity {
    pub fn is_paid(&self) -> bool {
        PaymentStatus::from_column(&self.payment_status) == PaymentStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscription_orders)]
pub struct InsertSubscriptionOrderEntity {
    pub order_id: String,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub app_id: String,
    pub amount: f64,
    pub currency: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
