use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, sql_query, sql_types::BigInt, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::{
        plans::PlanEntity,
        subscription_orders::SubscriptionOrderEntity,
        subscriptions::{SubscriptionEntity, UpdateSubscriptionStatusEntity},
    },
    repositories::subscriptions::SubscriptionRepository,
    schema::{plans, subscription_orders, user_subscriptions},
    value_objects::{
        enums::{payment_statuses::PaymentStatus, subscription_statuses::SubscriptionStatus},
        pagination::{Page, PageRequest},
        payments::{AppliedPayment, PaymentApplication},
        subscription_lifecycle,
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

/// Key for the per-user transaction-scoped advisory lock taken while applying payments.
pub fn advisory_lock_key(user_id: Uuid) -> i64 {
    let (high, low) = user_id.as_u64_pair();
    (high ^ low) as i64
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = user_subscriptions::table
            .filter(user_subscriptions::user_id.eq(user_id))
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn update_status(
        &self,
        user_id: Uuid,
        expected_status: SubscriptionStatus,
        update_entity: UpdateSubscriptionStatusEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(user_subscriptions::table)
            .filter(user_subscriptions::user_id.eq(user_id))
            .filter(user_subscriptions::status.eq(expected_status.to_string()))
            .set(&update_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_expiring(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: PageRequest,
    ) -> Result<Page<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;
        let active = SubscriptionStatus::Active.to_string();

        let total = user_subscriptions::table
            .filter(user_subscriptions::status.eq(&active))
            .filter(user_subscriptions::end_time.between(from, to))
            .count()
            .get_result::<i64>(&mut conn)?;

        let items = user_subscriptions::table
            .filter(user_subscriptions::status.eq(&active))
            .filter(user_subscriptions::end_time.between(from, to))
            .order(user_subscriptions::end_time.asc())
            .limit(page.page_size)
            .offset(page.offset())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(Page::new(items, total, page))
    }

    async fn list_auto_renew_due(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = user_subscriptions::table
            .filter(user_subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(user_subscriptions::auto_renew.eq(true))
            .filter(user_subscriptions::end_time.between(from, to))
            .order(user_subscriptions::end_time.asc())
            .select(SubscriptionEntity::as_select())
            .load::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn mark_expired(&self, now: DateTime<Utc>) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = update(user_subscriptions::table)
            .filter(user_subscriptions::status.eq(SubscriptionStatus::Active.to_string()))
            .filter(user_subscriptions::end_time.lt(now))
            .set((
                user_subscriptions::status.eq(SubscriptionStatus::Expired.to_string()),
                user_subscriptions::updated_at.eq(now),
            ))
            .returning(SubscriptionEntity::as_returning())
            .get_results::<SubscriptionEntity>(&mut conn)?;

        Ok(results)
    }

    async fn apply_paid_order(
        &self,
        order_id: String,
        now: DateTime<Utc>,
    ) -> Result<PaymentApplication> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let application = conn.transaction::<_, anyhow::Error, _>(|conn| {
            // Row lock serializes concurrent callbacks for the same order.
            let Some(order) = subscription_orders::table
                .filter(subscription_orders::order_id.eq(&order_id))
                .select(SubscriptionOrderEntity::as_select())
                .for_update()
                .first::<SubscriptionOrderEntity>(conn)
                .optional()?
            else {
                return Ok(PaymentApplication::OrderNotFound);
            };

            if order.is_paid() {
                return Ok(PaymentApplication::AlreadyPaid(order));
            }

            let Some(plan) = plans::table
                .filter(plans::plan_id.eq(order.plan_id))
                .select(PlanEntity::as_select())
                .first::<PlanEntity>(conn)
                .optional()?
            else {
                return Ok(PaymentApplication::PlanNotFound {
                    plan_id: order.plan_id,
                });
            };

            let paid_order = update(subscription_orders::table)
                .filter(subscription_orders::order_id.eq(&order_id))
                .set((
                    subscription_orders::payment_status.eq(PaymentStatus::Success.to_string()),
                    subscription_orders::updated_at.eq(now),
                ))
                .returning(SubscriptionOrderEntity::as_returning())
                .get_result::<SubscriptionOrderEntity>(conn)?;

            // FOR UPDATE locks nothing when the user has no row yet, so concurrent first
            // purchases serialize on the user instead.
            sql_query("SELECT pg_advisory_xact_lock($1)")
                .bind::<BigInt, _>(advisory_lock_key(paid_order.user_id))
                .execute(conn)?;

            let existing = user_subscriptions::table
                .filter(user_subscriptions::user_id.eq(paid_order.user_id))
                .select(SubscriptionEntity::as_select())
                .for_update()
                .first::<SubscriptionEntity>(conn)
                .optional()?;

            let (upsert, action) = subscription_lifecycle::apply_paid_order(
                &paid_order,
                plan.duration_days,
                existing.as_ref(),
                now,
            )?;

            let subscription = insert_into(user_subscriptions::table)
                .values(&upsert)
                .on_conflict(user_subscriptions::user_id)
                .do_update()
                .set(&upsert)
                .returning(SubscriptionEntity::as_returning())
                .get_result::<SubscriptionEntity>(conn)?;

            Ok(PaymentApplication::Applied(AppliedPayment {
                order: paid_order,
                subscription,
                plan_name: plan.name,
                action,
            }))
        })?;

        Ok(application)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advisory_lock_key_is_stable_per_user() {
        let user_id = Uuid::parse_str("6f1c2a9e-4b7d-4e0f-9a3c-2d5e8b1f7c40").unwrap();
        let other = Uuid::parse_str("0b8e5d2c-1f3a-4c6e-8d9b-7a2f4e6c1b30").unwrap();

        assert_eq!(advisory_lock_key(user_id), advisory_lock_key(user_id));
        assert_ne!(advisory_lock_key(user_id), advisory_lock_key(other));
        assert_ne!(advisory_lock_key(user_id), 0);
    }
}
