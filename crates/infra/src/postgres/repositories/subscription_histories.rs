use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::subscription_histories::{
        InsertSubscriptionHistoryEntity, SubscriptionHistoryEntity,
    },
    repositories::subscription_histories::SubscriptionHistoryRepository,
    schema::subscription_histories,
    value_objects::pagination::{Page, PageRequest},
};

pub struct SubscriptionHistoryPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionHistoryPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionHistoryRepository for SubscriptionHistoryPostgres {
    async fn append(&self, insert_history_entity: InsertSubscriptionHistoryEntity) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        insert_into(subscription_histories::table)
            .values(&insert_history_entity)
            .execute(&mut conn)?;

        Ok(())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<SubscriptionHistoryEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let total = subscription_histories::table
            .filter(subscription_histories::user_id.eq(user_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        let items = subscription_histories::table
            .filter(subscription_histories::user_id.eq(user_id))
            .order((
                subscription_histories::created_at.desc(),
                subscription_histories::subscription_history_id.desc(),
            ))
            .limit(page.page_size)
            .offset(page.offset())
            .select(SubscriptionHistoryEntity::as_select())
            .load::<SubscriptionHistoryEntity>(&mut conn)?;

        Ok(Page::new(items, total, page))
    }
}
