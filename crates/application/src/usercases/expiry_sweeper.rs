use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use domain::{
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::subscription_actions::SubscriptionAction, subscriptions::ExpirySweepReport,
    },
};

use crate::{
    context::RequestContext, errors::UseCaseResult, usercases::history::HistoryRecorder,
};

pub struct ExpirySweeperUseCase {
    subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
    history: Arc<HistoryRecorder>,
}

impl ExpirySweeperUseCase {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
        history: Arc<HistoryRecorder>,
    ) -> Self {
        Self {
            subscription_repository,
            history,
        }
    }

    /// Operator-triggered sweep.
    pub async fn sweep(&self, ctx: &RequestContext) -> UseCaseResult<ExpirySweepReport> {
        ctx.require_operator()?;
        self.update_expired_subscriptions().await
    }

    /// Moves every lapsed `active` subscription to `expired` in one statement, then appends one
    /// history row per affected user.
    pub async fn update_expired_subscriptions(&self) -> UseCaseResult<ExpirySweepReport> {
        let now = Utc::now();

        let expired = self.subscription_repository.mark_expired(now).await?;

        let mut user_ids = Vec::with_capacity(expired.len());
        for subscription in &expired {
            self.history
                .record_transition(subscription, SubscriptionAction::Expired, now)
                .await;
            user_ids.push(subscription.user_id);
        }

        info!(count = user_ids.len(), "expiry: subscriptions expired");

        Ok(ExpirySweepReport {
            count: user_ids.len(),
            user_ids,
        })
    }
}
