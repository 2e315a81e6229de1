use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use domain::{
    repositories::{plan_pricings::PlanPricingRepository, plans::PlanRepository},
    value_objects::{
        plans::ResolvedPrice,
        regions::{DEFAULT_REGION, SupportedRegions},
    },
};

use crate::errors::{SubscriptionError, UseCaseResult};

/// Flat per-country price lookup with a single fallback to the plan's own price.
pub struct PricingResolver {
    plan_repository: Arc<dyn PlanRepository + Send + Sync>,
    plan_pricing_repository: Arc<dyn PlanPricingRepository + Send + Sync>,
    supported_regions: SupportedRegions,
}

impl PricingResolver {
    pub fn new(
        plan_repository: Arc<dyn PlanRepository + Send + Sync>,
        plan_pricing_repository: Arc<dyn PlanPricingRepository + Send + Sync>,
        supported_regions: SupportedRegions,
    ) -> Self {
        Self {
            plan_repository,
            plan_pricing_repository,
            supported_regions,
        }
    }

    pub async fn resolve_price(
        &self,
        plan_id: Uuid,
        country_code: &str,
    ) -> UseCaseResult<ResolvedPrice> {
        let (region, fell_back) = self.supported_regions.normalize(country_code);
        if fell_back {
            warn!(
                %plan_id,
                requested_region = %country_code,
                "pricing: unsupported region, using default pricing"
            );
        }

        match self
            .plan_pricing_repository
            .find_by_plan_and_country(plan_id, region.clone())
            .await
        {
            Ok(Some(pricing)) => {
                debug!(%plan_id, %region, price = pricing.price, "pricing: regional price found");
                return Ok(ResolvedPrice {
                    price: pricing.price,
                    currency: pricing.currency,
                    region,
                });
            }
            Ok(None) => {
                debug!(%plan_id, %region, "pricing: no regional price, using plan default");
            }
            Err(err) => {
                warn!(
                    %plan_id,
                    %region,
                    db_error = ?err,
                    "pricing: regional lookup failed, using plan default"
                );
            }
        }

        let plan = self
            .plan_repository
            .find_by_id(plan_id)
            .await?
            .ok_or(SubscriptionError::PlanNotFound)?;

        Ok(ResolvedPrice {
            price: plan.price,
            currency: plan.currency,
            region: DEFAULT_REGION.to_string(),
        })
    }
}
