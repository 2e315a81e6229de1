use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::entities::plan_pricings::{
    InsertPlanPricingEntity, PlanPricingEntity, UpdatePlanPricingEntity,
};

#[automock]
#[async_trait]
pub trait PlanPricingRepository {
    async fn find_by_plan_and_country(
        &self,
        plan_id: Uuid,
        country_code: String,
    ) -> Result<Option<PlanPricingEntity>>;
    async fn find_by_id(&self, plan_pricing_id: i64) -> Result<Option<PlanPricingEntity>>;
    async fn list_by_plan(&self, plan_id: Uuid) -> Result<Vec<PlanPricingEntity>>;
    async fn create(
        &self,
        insert_plan_pricing_entity: InsertPlanPricingEntity,
    ) -> Result<PlanPricingEntity>;
    async fn update(
        &self,
        plan_pricing_id: i64,
        update_plan_pricing_entity: UpdatePlanPricingEntity,
    ) -> Result<Option<PlanPricingEntity>>;
    async fn delete(&self, plan_pricing_id: i64) -> Result<bool>;
}
