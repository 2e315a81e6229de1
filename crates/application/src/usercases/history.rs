use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, warn};

use domain::{
    entities::{
        subscription_histories::InsertSubscriptionHistoryEntity,
        subscriptions::SubscriptionEntity,
    },
    repositories::{plans::PlanRepository, subscription_histories::SubscriptionHistoryRepository},
    value_objects::enums::subscription_actions::SubscriptionAction,
};

/// Appends audit rows after the business write has committed. Never fails the caller.
pub struct HistoryRecorder {
    history_repository: Arc<dyn SubscriptionHistoryRepository + Send + Sync>,
    plan_repository: Arc<dyn PlanRepository + Send + Sync>,
}

impl HistoryRecorder {
    pub fn new(
        history_repository: Arc<dyn SubscriptionHistoryRepository + Send + Sync>,
        plan_repository: Arc<dyn PlanRepository + Send + Sync>,
    ) -> Self {
        Self {
            history_repository,
            plan_repository,
        }
    }

    /// Looks the plan name up itself; an unknown plan leaves the name empty.
    pub async fn record_transition(
        &self,
        subscription: &SubscriptionEntity,
        action: SubscriptionAction,
        now: DateTime<Utc>,
    ) {
        let plan_name = match self.plan_repository.find_by_id(subscription.plan_id).await {
            Ok(Some(plan)) => plan.name,
            Ok(None) => String::new(),
            Err(err) => {
                warn!(
                    user_id = %subscription.user_id,
                    plan_id = %subscription.plan_id,
                    db_error = ?err,
                    "history: failed to load plan name"
                );
                String::new()
            }
        };

        self.record(subscription, plan_name, action, now).await;
    }

    pub async fn record(
        &self,
        subscription: &SubscriptionEntity,
        plan_name: String,
        action: SubscriptionAction,
        now: DateTime<Utc>,
    ) {
        let entry = InsertSubscriptionHistoryEntity {
            user_id: subscription.user_id,
            plan_id: subscription.plan_id,
            plan_name,
            app_id: subscription.app_id.clone(),
            start_time: subscription.start_time,
            end_time: subscription.end_time,
            status: subscription.status.clone(),
            action: action.to_string(),
            created_at: now,
        };

        if let Err(err) = self.history_repository.append(entry).await {
            error!(
                user_id = %subscription.user_id,
                %action,
                db_error = ?err,
                "history: failed to append entry"
            );
        }
    }
}
