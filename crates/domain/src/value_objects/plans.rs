use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{plan_pricings::PlanPricingEntity, plans::PlanEntity};

pub const DEFAULT_PLAN_TYPE: &str = "subscription";

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanModel {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub currency: String,
    pub duration_days: i32,
    #[serde(default, rename = "type")]
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePlanModel {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub duration_days: Option<i32>,
    #[serde(default, rename = "type")]
    pub plan_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanModel {
    pub plan_id: Uuid,
    pub app_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub duration_days: i32,
    #[serde(rename = "type")]
    pub plan_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanEntity> for PlanModel {
    fn from(value: PlanEntity) -> Self {
        Self {
            plan_id: value.plan_id,
            app_id: value.app_id,
            name: value.name,
            description: value.description,
            price: value.price,
            currency: value.currency,
            duration_days: value.duration_days,
            plan_type: value.plan_type,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlanPricingModel {
    pub country_code: String,
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePlanPricingModel {
    pub price: f64,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanPricingModel {
    pub plan_pricing_id: i64,
    pub plan_id: Uuid,
    pub country_code: String,
    pub price: f64,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PlanPricingEntity> for PlanPricingModel {
    fn from(value: PlanPricingEntity) -> Self {
        Self {
            plan_pricing_id: value.plan_pricing_id,
            plan_id: value.plan_id,
            country_code: value.country_code,
            price: value.price,
            currency: value.currency,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

/// Price actually charged. `region` is `"default"` when the plan's own price was used.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub price: f64,
    pub currency: String,
    pub region: String,
}
