use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::plans;

#[derive(Debug, Clone, PartialEq, Identifiable, Selectable, Queryable)]
#[diesel(table_name = plans, primary_key(plan_id))]
pub struct PlanEntity {
    pub plan_id: Uuid,
    pub app_id: String,
    pub developer_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub duration_days: i32,
    #[diesel(column_name = type_)]
    pub plan_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = plans)]
pub struct InsertPlanEntity {
    pub app_id: String,
    pub developer_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub currency: String,
    pub duration_days: i32,
    #[diesel(column_name = type_)]
    pub plan_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = plans)]
pub struct UpdatePlanEntity {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub duration_days: Option<i32>,
    #[diesel(column_name = type_)]
    pub plan_type: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}
