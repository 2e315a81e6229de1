use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    schema::user_subscriptions, value_objects::enums::subscription_statuses::SubscriptionStatus,
};

/// One row per user. Serializable so the read-through cache can hold it.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Identifiable, Selectable, Queryable,
)]
#[diesel(table_name = user_subscriptions, primary_key(user_subscription_id))]
pub struct SubscriptionEntity {
    pub user_subscription_id: i64,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub app_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub auto_renew: bool,
    pub order_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionEntity {
    pub fn status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_column(&self.status)
    }
}

/// Written by payment reconciliation, either as a fresh row or over the user's existing one.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = user_subscriptions)]
pub struct UpsertSubscriptionEntity {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub app_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub auto_renew: bool,
    pub order_id: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, AsChangeset)]
#[diesel(table_name = user_subscriptions)]
pub struct UpdateSubscriptionStatusEntity {
    pub status: String,
    pub auto_renew: bool,
    pub updated_at: DateTime<Utc>,
}
