use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::subscription_orders::{InsertSubscriptionOrderEntity, SubscriptionOrderEntity},
    repositories::subscription_orders::SubscriptionOrderRepository,
    schema::subscription_orders,
};

pub struct SubscriptionOrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionOrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionOrderRepository for SubscriptionOrderPostgres {
    async fn create(
        &self,
        insert_order_entity: InsertSubscriptionOrderEntity,
    ) -> Result<SubscriptionOrderEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(subscription_orders::table)
            .values(&insert_order_entity)
            .returning(SubscriptionOrderEntity::as_returning())
            .get_result::<SubscriptionOrderEntity>(&mut conn)?;

        Ok(result)
    }

    async fn find_by_id(&self, order_id: String) -> Result<Option<SubscriptionOrderEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = subscription_orders::table
            .filter(subscription_orders::order_id.eq(order_id))
            .select(SubscriptionOrderEntity::as_select())
            .first::<SubscriptionOrderEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn set_payment_id(&self, order_id: String, payment_id: String) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(subscription_orders::table)
            .filter(subscription_orders::order_id.eq(order_id))
            .set((
                subscription_orders::payment_id.eq(Some(payment_id)),
                subscription_orders::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
