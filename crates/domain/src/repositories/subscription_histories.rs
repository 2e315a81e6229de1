use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::{
    entities::subscription_histories::{
        InsertSubscriptionHistoryEntity, SubscriptionHistoryEntity,
    },
    value_objects::pagination::{Page, PageRequest},
};

#[automock]
#[async_trait]
pub trait SubscriptionHistoryRepository {
    async fn append(&self, insert_history_entity: InsertSubscriptionHistoryEntity) -> Result<()>;
    async fn list_by_user(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<SubscriptionHistoryEntity>>;
}
