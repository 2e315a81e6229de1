use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use domain::{
    entities::{
        plan_pricings::{InsertPlanPricingEntity, PlanPricingEntity, UpdatePlanPricingEntity},
        plans::{InsertPlanEntity, PlanEntity, UpdatePlanEntity},
    },
    repositories::{plan_pricings::PlanPricingRepository, plans::PlanRepository},
    value_objects::{
        plans::{
            CreatePlanModel, CreatePlanPricingModel, DEFAULT_PLAN_TYPE, PlanModel,
            PlanPricingModel, UpdatePlanModel, UpdatePlanPricingModel,
        },
        regions::{DEFAULT_REGION, is_country_code},
    },
};

use crate::{
    context::RequestContext,
    errors::{SubscriptionError, UseCaseResult},
};

/// App-scoped plan catalog and its per-country price overrides.
pub struct PlanUseCase {
    plan_repository: Arc<dyn PlanRepository + Send + Sync>,
    plan_pricing_repository: Arc<dyn PlanPricingRepository + Send + Sync>,
}

impl PlanUseCase {
    pub fn new(
        plan_repository: Arc<dyn PlanRepository + Send + Sync>,
        plan_pricing_repository: Arc<dyn PlanPricingRepository + Send + Sync>,
    ) -> Self {
        Self {
            plan_repository,
            plan_pricing_repository,
        }
    }

    pub async fn list_plans(&self, ctx: &RequestContext) -> UseCaseResult<Vec<PlanModel>> {
        let app_id = ctx.require_app_id()?;
        let plans = self.plan_repository.list_by_app(app_id.to_string()).await?;

        Ok(plans.into_iter().map(PlanModel::from).collect())
    }

    pub async fn get_plan(&self, ctx: &RequestContext, plan_id: Uuid) -> UseCaseResult<PlanModel> {
        let plan = self.load_app_plan(ctx, plan_id).await?;
        Ok(plan.into())
    }

    pub async fn create_plan(
        &self,
        ctx: &RequestContext,
        model: CreatePlanModel,
    ) -> UseCaseResult<PlanModel> {
        let app_id = ctx.require_app_id()?.to_string();
        let developer_id = ctx.require_developer_id()?.to_string();

        validate_name(&model.name)?;
        validate_price(model.price)?;
        validate_duration(model.duration_days)?;
        let currency = normalize_currency(&model.currency)?;

        let now = Utc::now();
        let plan = self
            .plan_repository
            .create(InsertPlanEntity {
                app_id,
                developer_id,
                name: model.name.trim().to_string(),
                description: model.description.unwrap_or_default(),
                price: model.price,
                currency,
                duration_days: model.duration_days,
                plan_type: model
                    .plan_type
                    .filter(|t| !t.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PLAN_TYPE.to_string()),
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(plan_id = %plan.plan_id, app_id = %plan.app_id, "plans: plan created");
        Ok(plan.into())
    }

    pub async fn update_plan(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
        model: UpdatePlanModel,
    ) -> UseCaseResult<PlanModel> {
        self.load_owned_plan(ctx, plan_id).await?;

        if let Some(name) = model.name.as_deref() {
            validate_name(name)?;
        }
        if let Some(price) = model.price {
            validate_price(price)?;
        }
        if let Some(duration_days) = model.duration_days {
            validate_duration(duration_days)?;
        }
        let currency = model
            .currency
            .as_deref()
            .map(normalize_currency)
            .transpose()?;

        let update = UpdatePlanEntity {
            name: model.name.map(|n| n.trim().to_string()),
            description: model.description,
            price: model.price,
            currency,
            duration_days: model.duration_days,
            plan_type: model.plan_type,
            updated_at: Some(Utc::now()),
        };

        let plan = self
            .plan_repository
            .update(plan_id, update)
            .await?
            .ok_or(SubscriptionError::PlanNotFound)?;

        info!(%plan_id, "plans: plan updated");
        Ok(plan.into())
    }

    pub async fn delete_plan(&self, ctx: &RequestContext, plan_id: Uuid) -> UseCaseResult<()> {
        self.load_owned_plan(ctx, plan_id).await?;

        if !self.plan_repository.delete(plan_id).await? {
            return Err(SubscriptionError::PlanNotFound);
        }

        info!(%plan_id, "plans: plan deleted");
        Ok(())
    }

    pub async fn list_pricings(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
    ) -> UseCaseResult<Vec<PlanPricingModel>> {
        self.load_app_plan(ctx, plan_id).await?;
        let pricings = self.plan_pricing_repository.list_by_plan(plan_id).await?;

        Ok(pricings.into_iter().map(PlanPricingModel::from).collect())
    }

    pub async fn get_pricing(
        &self,
        ctx: &RequestContext,
        plan_pricing_id: i64,
    ) -> UseCaseResult<PlanPricingModel> {
        let pricing = self.load_pricing(plan_pricing_id).await?;
        self.load_app_plan(ctx, pricing.plan_id).await?;

        Ok(pricing.into())
    }

    pub async fn create_pricing(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
        model: CreatePlanPricingModel,
    ) -> UseCaseResult<PlanPricingModel> {
        self.load_owned_plan(ctx, plan_id).await?;

        let country_code = normalize_country_code(&model.country_code)?;
        validate_price(model.price)?;
        let currency = normalize_currency(&model.currency)?;

        if self
            .plan_pricing_repository
            .find_by_plan_and_country(plan_id, country_code.clone())
            .await?
            .is_some()
        {
            return Err(SubscriptionError::invalid_argument(format!(
                "pricing for region {} already exists",
                country_code
            )));
        }

        let now = Utc::now();
        let pricing = self
            .plan_pricing_repository
            .create(InsertPlanPricingEntity {
                plan_id,
                country_code,
                price: model.price,
                currency,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!(
            %plan_id,
            plan_pricing_id = pricing.plan_pricing_id,
            country_code = %pricing.country_code,
            "plans: pricing created"
        );
        Ok(pricing.into())
    }

    pub async fn update_pricing(
        &self,
        ctx: &RequestContext,
        plan_pricing_id: i64,
        model: UpdatePlanPricingModel,
    ) -> UseCaseResult<PlanPricingModel> {
        let pricing = self.load_pricing(plan_pricing_id).await?;
        self.load_owned_plan(ctx, pricing.plan_id).await?;

        validate_price(model.price)?;
        let currency = normalize_currency(&model.currency)?;

        let updated = self
            .plan_pricing_repository
            .update(
                plan_pricing_id,
                UpdatePlanPricingEntity {
                    price: model.price,
                    currency,
                    updated_at: Utc::now(),
                },
            )
            .await?
            .ok_or(SubscriptionError::PlanPricingNotFound)?;

        info!(plan_pricing_id, "plans: pricing updated");
        Ok(updated.into())
    }

    pub async fn delete_pricing(
        &self,
        ctx: &RequestContext,
        plan_pricing_id: i64,
    ) -> UseCaseResult<()> {
        let pricing = self.load_pricing(plan_pricing_id).await?;
        self.load_owned_plan(ctx, pricing.plan_id).await?;

        if !self.plan_pricing_repository.delete(plan_pricing_id).await? {
            return Err(SubscriptionError::PlanPricingNotFound);
        }

        info!(plan_pricing_id, "plans: pricing deleted");
        Ok(())
    }

    /// Plans of other apps read as missing.
    async fn load_app_plan(&self, ctx: &RequestContext, plan_id: Uuid) -> UseCaseResult<PlanEntity> {
        let app_id = ctx.require_app_id()?;
        let plan = self
            .plan_repository
            .find_by_id(plan_id)
            .await?
            .ok_or(SubscriptionError::PlanNotFound)?;

        if plan.app_id != app_id {
            warn!(%plan_id, %app_id, owner_app_id = %plan.app_id, "plans: cross-app plan access");
            return Err(SubscriptionError::PlanNotFound);
        }

        Ok(plan)
    }

    async fn load_owned_plan(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
    ) -> UseCaseResult<PlanEntity> {
        let developer_id = ctx.require_developer_id()?;
        let plan = self.load_app_plan(ctx, plan_id).await?;

        if plan.developer_id != developer_id {
            return Err(SubscriptionError::PermissionDenied(
                "plan belongs to another developer".into(),
            ));
        }

        Ok(plan)
    }

    async fn load_pricing(&self, plan_pricing_id: i64) -> UseCaseResult<PlanPricingEntity> {
        self.plan_pricing_repository
            .find_by_id(plan_pricing_id)
            .await?
            .ok_or(SubscriptionError::PlanPricingNotFound)
    }
}

fn validate_name(name: &str) -> UseCaseResult<()> {
    if name.trim().is_empty() {
        return Err(SubscriptionError::invalid_argument("plan name is required"));
    }
    Ok(())
}

fn validate_price(price: f64) -> UseCaseResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(SubscriptionError::PlanPriceInvalid);
    }
    Ok(())
}

/// Longest plan period accepted, roughly a century.
pub const MAX_DURATION_DAYS: i32 = 36_500;

fn validate_duration(duration_days: i32) -> UseCaseResult<()> {
    if duration_days <= 0 {
        return Err(SubscriptionError::invalid_argument(
            "duration_days must be positive",
        ));
    }
    if duration_days > MAX_DURATION_DAYS {
        return Err(SubscriptionError::invalid_argument(format!(
            "duration_days must not exceed {}",
            MAX_DURATION_DAYS
        )));
    }
    Ok(())
}

fn normalize_currency(currency: &str) -> UseCaseResult<String> {
    let currency = currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SubscriptionError::invalid_argument(
            "currency must be a three-letter code",
        ));
    }
    Ok(currency)
}

fn normalize_country_code(country_code: &str) -> UseCaseResult<String> {
    let trimmed = country_code.trim();
    if trimmed.eq_ignore_ascii_case(DEFAULT_REGION) {
        return Ok(DEFAULT_REGION.to_string());
    }

    let upper = trimmed.to_ascii_uppercase();
    if !is_country_code(&upper) {
        return Err(SubscriptionError::invalid_argument(format!(
            "invalid country code: {}",
            country_code
        )));
    }
    Ok(upper)
}
