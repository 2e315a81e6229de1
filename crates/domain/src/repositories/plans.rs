use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity};

#[automock]
#[async_trait]
pub trait PlanRepository {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>>;
    async fn list_by_app(&self, app_id: String) -> Result<Vec<PlanEntity>>;
    async fn create(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity>;
    async fn update(
        &self,
        plan_id: Uuid,
        update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>>;
    async fn delete(&self, plan_id: Uuid) -> Result<bool>;
}
