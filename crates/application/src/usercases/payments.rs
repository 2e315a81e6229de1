use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        payments::PaymentApplication,
        subscriptions::{SubscriptionModel, SubscriptionOrderModel},
    },
};

use crate::{
    errors::{SubscriptionError, UseCaseResult},
    usercases::history::HistoryRecorder,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSuccessResult {
    /// Set when the order had already been applied by an earlier callback.
    pub already_paid: bool,
    pub order: SubscriptionOrderModel,
    pub subscription: Option<SubscriptionModel>,
}

pub struct PaymentReconciliationUseCase {
    subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
    history: Arc<HistoryRecorder>,
}

impl PaymentReconciliationUseCase {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
        history: Arc<HistoryRecorder>,
    ) -> Self {
        Self {
            subscription_repository,
            history,
        }
    }

    /// Safe to call repeatedly for the same order: only the first call extends the subscription.
    pub async fn handle_payment_success(
        &self,
        order_id: &str,
        amount: Option<f64>,
    ) -> UseCaseResult<PaymentSuccessResult> {
        if order_id.trim().is_empty() {
            return Err(SubscriptionError::invalid_argument("order id is required"));
        }
        let now = Utc::now();

        let application = self
            .subscription_repository
            .apply_paid_order(order_id.to_string(), now)
            .await
            .map_err(|err| {
                error!(%order_id, db_error = ?err, "payments: reconciliation rolled back");
                SubscriptionError::Internal(err)
            })?;

        let applied = match application {
            PaymentApplication::OrderNotFound => {
                warn!(%order_id, "payments: callback for unknown order");
                return Err(SubscriptionError::OrderNotFound);
            }
            PaymentApplication::PlanNotFound { plan_id } => {
                error!(%order_id, %plan_id, "payments: order references a missing plan");
                return Err(SubscriptionError::PlanNotFound);
            }
            PaymentApplication::AlreadyPaid(order) => {
                info!(%order_id, "payments: order already paid, nothing to do");
                return Ok(PaymentSuccessResult {
                    already_paid: true,
                    order: order.into(),
                    subscription: None,
                });
            }
            PaymentApplication::Applied(applied) => applied,
        };

        if let Some(amount) = amount {
            if (amount - applied.order.amount).abs() > f64::EPSILON {
                warn!(
                    %order_id,
                    reported = amount,
                    expected = applied.order.amount,
                    "payments: callback amount differs from order amount"
                );
            }
        }

        info!(
            %order_id,
            user_id = %applied.subscription.user_id,
            action = %applied.action,
            end_time = %applied.subscription.end_time,
            "payments: subscription updated"
        );

        self.history
            .record(&applied.subscription, applied.plan_name, applied.action, now)
            .await;

        Ok(PaymentSuccessResult {
            already_paid: false,
            order: applied.order.into(),
            subscription: Some(SubscriptionModel::from_entity(applied.subscription, now)),
        })
    }
}
