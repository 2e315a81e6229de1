use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::entities::subscription_orders::{
    InsertSubscriptionOrderEntity, SubscriptionOrderEntity,
};

#[automock]
#[async_trait]
pub trait SubscriptionOrderRepository {
    async fn create(
        &self,
        insert_order_entity: InsertSubscriptionOrderEntity,
    ) -> Result<SubscriptionOrderEntity>;
    async fn find_by_id(&self, order_id: String) -> Result<Option<SubscriptionOrderEntity>>;
    async fn set_payment_id(&self, order_id: String, payment_id: String) -> Result<()>;
}
