use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::subscription_histories;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscription_histories, primary_key(subscription_history_id))]
pub struct SubscriptionHistoryEntity {
    pub subscription_history_id: i64,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub app_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = subscription_histories)]
pub struct InsertSubscriptionHistoryEntity {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub app_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}
