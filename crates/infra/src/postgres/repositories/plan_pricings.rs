use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::plan_pricings::{InsertPlanPricingEntity, PlanPricingEntity, UpdatePlanPricingEntity},
    repositories::plan_pricings::PlanPricingRepository,
    schema::plan_pricings,
};

pub struct PlanPricingPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPricingPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanPricingRepository for PlanPricingPostgres {
    async fn find_by_plan_and_country(
        &self,
        plan_id: Uuid,
        country_code: String,
    ) -> Result<Option<PlanPricingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plan_pricings::table
            .filter(plan_pricings::plan_id.eq(plan_id))
            .filter(plan_pricings::country_code.eq(country_code))
            .select(PlanPricingEntity::as_select())
            .first::<PlanPricingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn find_by_id(&self, plan_pricing_id: i64) -> Result<Option<PlanPricingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plan_pricings::table
            .filter(plan_pricings::plan_pricing_id.eq(plan_pricing_id))
            .select(PlanPricingEntity::as_select())
            .first::<PlanPricingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_plan(&self, plan_id: Uuid) -> Result<Vec<PlanPricingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plan_pricings::table
            .filter(plan_pricings::plan_id.eq(plan_id))
            .order(plan_pricings::country_code.asc())
            .select(PlanPricingEntity::as_select())
            .load::<PlanPricingEntity>(&mut conn)?;

        Ok(results)
    }

    async fn create(
        &self,
        insert_plan_pricing_entity: InsertPlanPricingEntity,
    ) -> Result<PlanPricingEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(plan_pricings::table)
            .values(&insert_plan_pricing_entity)
            .returning(PlanPricingEntity::as_returning())
            .get_result::<PlanPricingEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update(
        &self,
        plan_pricing_id: i64,
        update_plan_pricing_entity: UpdatePlanPricingEntity,
    ) -> Result<Option<PlanPricingEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(plan_pricings::table)
            .filter(plan_pricings::plan_pricing_id.eq(plan_pricing_id))
            .set(&update_plan_pricing_entity)
            .returning(PlanPricingEntity::as_returning())
            .get_result::<PlanPricingEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, plan_pricing_id: i64) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(plan_pricings::table)
            .filter(plan_pricings::plan_pricing_id.eq(plan_pricing_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
