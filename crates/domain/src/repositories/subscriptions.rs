use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::{
    entities::subscriptions::{SubscriptionEntity, UpdateSubscriptionStatusEntity},
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        pagination::{Page, PageRequest},
        payments::PaymentApplication,
    },
};

#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>>;

    /// Compare-and-set on the stored status. `None` when the row is missing or its status is no
    /// longer `expected_status`.
    async fn update_status(
        &self,
        user_id: Uuid,
        expected_status: SubscriptionStatus,
        update_entity: UpdateSubscriptionStatusEntity,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Active subscriptions ending within `[from, to]`, soonest first.
    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<SubscriptionEntity>>;

    /// Active, auto-renewing subscriptions ending within `[from, to]`.
    async fn list_auto_renew_due(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SubscriptionEntity>>;

    /// Bulk `active -> expired` for every row with `end_time < now`; returns the updated rows.
    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>>;

    /// Marks the order paid and activates or extends the owner's subscription in one
    /// transaction. Repeated calls for a paid order write nothing.
    async fn apply_paid_order(
        &self,
        order_id: String,
        now: DateTime<Utc>,
    ) -> Result<PaymentApplication>;
}
