use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use domain::{
    entities::subscription_orders::InsertSubscriptionOrderEntity,
    repositories::{plans::PlanRepository, subscription_orders::SubscriptionOrderRepository},
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        regions::DEFAULT_REGION,
        subscriptions::{CreateOrderModel, CreatedOrderModel, SubscriptionOrderModel},
    },
};

use crate::{
    context::RequestContext,
    errors::{SubscriptionError, UseCaseResult},
    interfaces::payment_gateway::{CreatePaymentRequest, PaymentGateway, PaymentGatewayError},
    usercases::{pricing::PricingResolver, region_detection::RegionDetector},
};

pub const PAYMENT_SOURCE: &str = "subscription";
pub const AUTO_RENEW_PAYMENT_METHOD: &str = "auto";

#[derive(Debug, Clone, Default)]
pub struct OrderSettings {
    pub return_url: Option<String>,
}

pub struct OrderUseCase {
    pricing_resolver: Arc<PricingResolver>,
    region_detector: Arc<RegionDetector>,
    plan_repository: Arc<dyn PlanRepository + Send + Sync>,
    order_repository: Arc<dyn SubscriptionOrderRepository + Send + Sync>,
    payment_gateway: Arc<dyn PaymentGateway>,
    settings: OrderSettings,
}

impl OrderUseCase {
    pub fn new(
        pricing_resolver: Arc<PricingResolver>,
        region_detector: Arc<RegionDetector>,
        plan_repository: Arc<dyn PlanRepository + Send + Sync>,
        order_repository: Arc<dyn SubscriptionOrderRepository + Send + Sync>,
        payment_gateway: Arc<dyn PaymentGateway>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            pricing_resolver,
            region_detector,
            plan_repository,
            order_repository,
            payment_gateway,
            settings,
        }
    }

    /// Client checkout. The pricing region comes from the request or is detected from the caller.
    pub async fn create_order(
        &self,
        ctx: &RequestContext,
        model: CreateOrderModel,
    ) -> UseCaseResult<CreatedOrderModel> {
        let region = match model.region.filter(|r| !r.trim().is_empty()) {
            Some(region) => region,
            None => self.region_detector.detect_region(ctx).await,
        };

        self.place_order(ctx, model.plan_id, &model.payment_method, &region)
            .await
    }

    /// Scheduled renewal: default pricing region, auto-capture method.
    pub async fn create_renewal_order(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
    ) -> UseCaseResult<CreatedOrderModel> {
        self.place_order(ctx, plan_id, AUTO_RENEW_PAYMENT_METHOD, DEFAULT_REGION)
            .await
    }

    async fn place_order(
        &self,
        ctx: &RequestContext,
        plan_id: Uuid,
        method: &str,
        region: &str,
    ) -> UseCaseResult<CreatedOrderModel> {
        let user_id = ctx.require_user_id()?;
        if method.trim().is_empty() {
            return Err(SubscriptionError::invalid_argument("payment method is required"));
        }

        let price = self.pricing_resolver.resolve_price(plan_id, region).await?;

        let app_id = ctx.require_app_id()?;
        let plan = self
            .plan_repository
            .find_by_id(plan_id)
            .await?
            .ok_or(SubscriptionError::PlanNotFound)?;
        if plan.app_id != app_id {
            warn!(%user_id, %plan_id, %app_id, "orders: plan belongs to another app");
            return Err(SubscriptionError::invalid_argument(
                "plan does not belong to this app",
            ));
        }

        let return_url = self.settings.return_url.clone().ok_or_else(|| {
            SubscriptionError::Configuration("subscription return url is not configured".into())
        })?;

        let now = Utc::now();
        let order = self
            .order_repository
            .create(InsertSubscriptionOrderEntity {
                order_id: generate_order_id(user_id, now),
                user_id,
                plan_id,
                app_id: app_id.to_string(),
                amount: price.price,
                currency: price.currency.clone(),
                payment_status: PaymentStatus::Pending.to_string(),
                created_at: now,
                updated_at: now,
            })
            .await
            .map_err(|err| {
                error!(%user_id, %plan_id, db_error = ?err, "orders: failed to persist order");
                SubscriptionError::OrderCreateFailed(err)
            })?;

        let payment = self
            .payment_gateway
            .create_payment(CreatePaymentRequest {
                order_id: order.order_id.clone(),
                user_id,
                app_id: order.app_id.clone(),
                amount: order.amount,
                currency: order.currency.clone(),
                method: method.to_string(),
                subject: payment_subject(&plan.name),
                return_url,
                source: PAYMENT_SOURCE.to_string(),
            })
            .await
            .map_err(|err| match err {
                PaymentGatewayError::NotConfigured => {
                    error!(order_id = %order.order_id, "orders: payment service is not configured");
                    SubscriptionError::Configuration(err.to_string())
                }
                PaymentGatewayError::Upstream(err) => {
                    error!(order_id = %order.order_id, error = ?err, "orders: payment service call failed");
                    SubscriptionError::PaymentFailed(err)
                }
            })?;

        // The provider already holds the payment; a lost reference is recoverable.
        if let Err(err) = self
            .order_repository
            .set_payment_id(order.order_id.clone(), payment.payment_id.clone())
            .await
        {
            error!(
                order_id = %order.order_id,
                payment_id = %payment.payment_id,
                db_error = ?err,
                "orders: failed to store payment reference"
            );
        }

        info!(
            %user_id,
            %plan_id,
            order_id = %order.order_id,
            payment_id = %payment.payment_id,
            amount = order.amount,
            currency = %order.currency,
            region = %price.region,
            "orders: order created"
        );

        let mut order = SubscriptionOrderModel::from(order);
        order.payment_id = Some(payment.payment_id.clone());

        Ok(CreatedOrderModel {
            order,
            payment_id: payment.payment_id,
            pay_url: payment.pay_url,
            pay_code: payment.pay_code,
            pay_params: payment.pay_params,
        })
    }
}

/// `SUB` + nanosecond timestamp + user id, unique per user per instant.
pub fn generate_order_id(user_id: Uuid, now: DateTime<Utc>) -> String {
    let nanos = now
        .timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros().saturating_mul(1_000));
    format!("SUB{}{}", nanos, user_id.simple())
}

pub fn payment_subject(plan_name: &str) -> String {
    if plan_name.trim().is_empty() {
        "Subscription".to_string()
    } else {
        format!("Subscription: {}", plan_name)
    }
}
