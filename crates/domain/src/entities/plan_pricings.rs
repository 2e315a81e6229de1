use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::plan_pricings;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plan_pricings, primary_key(plan_pricing_id))]
pub struct PlanPricingEntity {
    pub plan_pricing_id: i64,
    pub plan_id: Uuid,
    pub country_code: String,
    pub price: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plan_pricings)]
pub struct InsertPlanPricingEntity {
    pub plan_id: Uuid,
    pub country_code: String,
    pub price: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = plan_pricings)]
pub struct UpdatePlanPricingEntity {
    pub price: f64,
    pub currency: String,
    pub updated_at: DateTime<Utc>,
}
