use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::postgres::postgres_connection::PgPoolSquad;
use domain::{
    entities::plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
    repositories::plans::PlanRepository,
    schema::plans,
};

pub struct PlanPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PlanPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PlanRepository for PlanPostgres {
    async fn find_by_id(&self, plan_id: Uuid) -> Result<Option<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = plans::table
            .filter(plans::plan_id.eq(plan_id))
            .select(PlanEntity::as_select())
            .first::<PlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn list_by_app(&self, app_id: String) -> Result<Vec<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let results = plans::table
            .filter(plans::app_id.eq(app_id))
            .order((plans::price.asc(), plans::created_at.asc()))
            .select(PlanEntity::as_select())
            .load::<PlanEntity>(&mut conn)?;

        Ok(results)
    }

    async fn create(&self, insert_plan_entity: InsertPlanEntity) -> Result<PlanEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = insert_into(plans::table)
            .values(&insert_plan_entity)
            .returning(PlanEntity::as_returning())
            .get_result::<PlanEntity>(&mut conn)?;

        Ok(result)
    }

    async fn update(
        &self,
        plan_id: Uuid,
        update_plan_entity: UpdatePlanEntity,
    ) -> Result<Option<PlanEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = update(plans::table)
            .filter(plans::plan_id.eq(plan_id))
            .set(&update_plan_entity)
            .returning(PlanEntity::as_returning())
            .get_result::<PlanEntity>(&mut conn)
            .optional()?;

        Ok(result)
    }

    async fn delete(&self, plan_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // plan_pricings rows go with it (ON DELETE CASCADE).
        let deleted = delete(plans::table)
            .filter(plans::plan_id.eq(plan_id))
            .execute(&mut conn)?;

        Ok(deleted > 0)
    }
}
