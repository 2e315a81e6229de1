use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use domain::{
    repositories::{
        subscription_histories::SubscriptionHistoryRepository,
        subscriptions::SubscriptionRepository,
    },
    value_objects::{
        pagination::{Page, PageRequest},
        subscription_lifecycle::{InvalidTransition, SubscriptionEvent, transition},
        subscriptions::{SubscriptionHistoryModel, SubscriptionModel},
    },
};

use crate::{
    context::RequestContext,
    errors::{SubscriptionError, UseCaseResult},
    usercases::history::HistoryRecorder,
};

pub const DEFAULT_EXPIRING_DAYS: i64 = 7;
pub const MAX_EXPIRING_DAYS: i64 = 30;

pub struct SubscriptionUseCase {
    subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
    history_repository: Arc<dyn SubscriptionHistoryRepository + Send + Sync>,
    history: Arc<HistoryRecorder>,
}

impl SubscriptionUseCase {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
        history_repository: Arc<dyn SubscriptionHistoryRepository + Send + Sync>,
        history: Arc<HistoryRecorder>,
    ) -> Self {
        Self {
            subscription_repository,
            history_repository,
            history,
        }
    }

    /// `None` when the caller never subscribed.
    pub async fn get_my_subscription(
        &self,
        ctx: &RequestContext,
    ) -> UseCaseResult<Option<SubscriptionModel>> {
        let user_id = ctx.require_user_id()?;
        let now = Utc::now();

        let subscription = self.subscription_repository.find_by_user_id(user_id).await?;

        Ok(subscription.map(|entity| SubscriptionModel::from_entity(entity, now)))
    }

    pub async fn cancel(
        &self,
        ctx: &RequestContext,
        reason: Option<String>,
    ) -> UseCaseResult<SubscriptionModel> {
        let subscription = self.apply_event(ctx, SubscriptionEvent::Cancel).await?;
        info!(
            user_id = %subscription.user_id,
            reason = reason.as_deref().unwrap_or(""),
            "subscriptions: cancelled"
        );
        Ok(subscription)
    }

    pub async fn pause(
        &self,
        ctx: &RequestContext,
        reason: Option<String>,
    ) -> UseCaseResult<SubscriptionModel> {
        let subscription = self.apply_event(ctx, SubscriptionEvent::Pause).await?;
        info!(
            user_id = %subscription.user_id,
            reason = reason.as_deref().unwrap_or(""),
            "subscriptions: paused"
        );
        Ok(subscription)
    }

    pub async fn resume(&self, ctx: &RequestContext) -> UseCaseResult<SubscriptionModel> {
        self.apply_event(ctx, SubscriptionEvent::Resume).await
    }

    pub async fn set_auto_renew(
        &self,
        ctx: &RequestContext,
        enabled: bool,
    ) -> UseCaseResult<SubscriptionModel> {
        self.apply_event(ctx, SubscriptionEvent::SetAutoRenew(enabled))
            .await
    }

    pub async fn history(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> UseCaseResult<Page<SubscriptionHistoryModel>> {
        let user_id = ctx.require_user_id()?;

        let entries = self.history_repository.list_by_user(user_id, page).await?;

        Ok(entries.map(SubscriptionHistoryModel::from))
    }

    /// Operator listing of active subscriptions ending within `days` (1..=30, default 7).
    pub async fn expiring(
        &self,
        ctx: &RequestContext,
        days: Option<i64>,
        page: PageRequest,
    ) -> UseCaseResult<Page<SubscriptionModel>> {
        ctx.require_operator()?;
        let days = match days {
            None => DEFAULT_EXPIRING_DAYS,
            Some(days) if (1..=MAX_EXPIRING_DAYS).contains(&days) => days,
            Some(_) => {
                return Err(SubscriptionError::invalid_argument(
                    "days must be between 1 and 30",
                ));
            }
        };

        let now = Utc::now();
        let expiring = self
            .subscription_repository
            .list_expiring(now, now + Duration::days(days), page)
            .await?;

        Ok(expiring.map(SubscriptionModel::from))
    }

    async fn apply_event(
        &self,
        ctx: &RequestContext,
        event: SubscriptionEvent,
    ) -> UseCaseResult<SubscriptionModel> {
        let user_id = ctx.require_user_id()?;
        let now = Utc::now();

        let current = self
            .subscription_repository
            .find_by_user_id(user_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        let change = transition(&current, event, now).inspect_err(|err| {
            warn!(%user_id, error = %err, "subscriptions: transition rejected");
        })?;

        let updated = match self
            .subscription_repository
            .update_status(user_id, change.from, change.to_update_entity(now))
            .await?
        {
            Some(updated) => updated,
            None => {
                // Lost a race with another writer; report against the status that won.
                let latest = self
                    .subscription_repository
                    .find_by_user_id(user_id)
                    .await?
                    .ok_or(SubscriptionError::SubscriptionNotFound)?;
                warn!(%user_id, status = %latest.status, "subscriptions: status changed concurrently");
                return Err(InvalidTransition {
                    operation: event.operation(),
                    status: latest.status(),
                }
                .into());
            }
        };

        self.history
            .record_transition(&updated, change.action, now)
            .await;

        Ok(SubscriptionModel::from_entity(updated, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::codes,
        usercases::test_support::{self, InMemoryStore},
    };
    use domain::{
        repositories::{
            plans::MockPlanRepository, subscription_histories::MockSubscriptionHistoryRepository,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::enums::subscription_statuses::SubscriptionStatus,
    };
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn user_ctx(user_id: Uuid) -> RequestContext {
        RequestContext {
            app_id: Some("app-1".to_string()),
            user_id: Some(user_id),
            ..RequestContext::default()
        }
    }

    fn usecase(store: &Arc<InMemoryStore>) -> SubscriptionUseCase {
        let history = Arc::new(HistoryRecorder::new(store.clone(), store.clone()));
        SubscriptionUseCase::new(store.clone(), store.clone(), history)
    }

    fn store_with(status: SubscriptionStatus, auto_renew: bool) -> (Arc<InMemoryStore>, Uuid) {
        let store = Arc::new(InMemoryStore::default());
        let plan = test_support::plan("app-1", 9.99, "USD", 30);
        let user_id = Uuid::new_v4();
        store.insert_subscription(test_support::subscription(
            user_id,
            plan.plan_id,
            status,
            Utc::now() + Duration::days(10),
            auto_renew,
        ));
        store.insert_plan(plan);
        (store, user_id)
    }

    #[tokio::test]
    async fn pause_on_cancelled_fails_without_writing() {
        let user_id = Uuid::new_v4();
        let cancelled = test_support::subscription(
            user_id,
            Uuid::new_v4(),
            SubscriptionStatus::Cancelled,
            Utc::now() + Duration::days(3),
            false,
        );
        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_by_user_id()
            .with(eq(user_id))
            .returning(move |_| Ok(Some(cancelled.clone())));
        subscriptions.expect_update_status().never();
        let mut histories = MockSubscriptionHistoryRepository::new();
        histories.expect_append().never();
        let histories = Arc::new(histories);

        let history = Arc::new(HistoryRecorder::new(
            histories.clone(),
            Arc::new(MockPlanRepository::new()),
        ));
        let err = SubscriptionUseCase::new(Arc::new(subscriptions), histories, history)
            .pause(&user_ctx(user_id), None)
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::CANNOT_PAUSE_STATUS);
        assert_eq!(
            err.to_string(),
            "cannot pause a subscription that is cancelled"
        );
    }

    #[tokio::test]
    async fn cancel_turns_auto_renew_off_and_records_history() {
        let (store, user_id) = store_with(SubscriptionStatus::Active, true);

        let cancelled = usecase(&store)
            .cancel(&user_ctx(user_id), Some("too expensive".to_string()))
            .await
            .unwrap();

        assert_eq!(cancelled.status, SubscriptionStatus::Cancelled);
        assert!(!cancelled.auto_renew);
        let state = store.state();
        assert_eq!(state.histories.len(), 1);
        assert_eq!(state.histories[0].action, "cancelled");
        assert_eq!(state.histories[0].plan_name, "monthly");
    }

    #[tokio::test]
    async fn pause_then_resume_returns_to_active() {
        let (store, user_id) = store_with(SubscriptionStatus::Active, false);
        let usecase = usecase(&store);

        usecase.pause(&user_ctx(user_id), None).await.unwrap();
        let resumed = usecase.resume(&user_ctx(user_id)).await.unwrap();

        assert_eq!(resumed.status, SubscriptionStatus::Active);
        let actions: Vec<String> = store
            .state()
            .histories
            .iter()
            .map(|h| h.action.clone())
            .collect();
        assert_eq!(actions, vec!["paused", "resumed"]);
    }

    #[tokio::test]
    async fn set_auto_renew_records_enable_and_disable() {
        let (store, user_id) = store_with(SubscriptionStatus::Active, false);
        let usecase = usecase(&store);

        let enabled = usecase.set_auto_renew(&user_ctx(user_id), true).await.unwrap();
        assert!(enabled.auto_renew);
        let disabled = usecase.set_auto_renew(&user_ctx(user_id), false).await.unwrap();
        assert!(!disabled.auto_renew);

        let actions: Vec<String> = store
            .state()
            .histories
            .iter()
            .map(|h| h.action.clone())
            .collect();
        assert_eq!(actions, vec!["enabled_auto_renew", "disabled_auto_renew"]);
    }

    #[tokio::test]
    async fn set_auto_renew_on_paused_is_rejected() {
        let (store, user_id) = store_with(SubscriptionStatus::Paused, false);

        let err = usecase(&store)
            .set_auto_renew(&user_ctx(user_id), true)
            .await
            .unwrap_err();

        assert_eq!(err.code(), codes::CANNOT_SET_AUTO_RENEW);
        assert!(store.state().histories.is_empty());
    }

    #[tokio::test]
    async fn lapsed_active_subscription_reads_as_expired_without_write() {
        let store = Arc::new(InMemoryStore::default());
        let user_id = Uuid::new_v4();
        store.insert_subscription(test_support::subscription(
            user_id,
            Uuid::new_v4(),
            SubscriptionStatus::Active,
            Utc::now() - Duration::days(1),
            false,
        ));

        let view = usecase(&store)
            .get_my_subscription(&user_ctx(user_id))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.status, SubscriptionStatus::Expired);
        assert_eq!(
            store.subscription_of(user_id).unwrap().status(),
            SubscriptionStatus::Active
        );
    }

    #[tokio::test]
    async fn missing_subscription_is_not_found_for_transitions() {
        let store = Arc::new(InMemoryStore::default());

        let err = usecase(&store)
            .resume(&user_ctx(Uuid::new_v4()))
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::SubscriptionNotFound));
    }

    #[tokio::test]
    async fn lost_race_reports_the_winning_status() {
        let user_id = Uuid::new_v4();
        let plan_id = Uuid::new_v4();
        let end = Utc::now() + Duration::days(3);
        let active =
            test_support::subscription(user_id, plan_id, SubscriptionStatus::Active, end, true);
        let cancelled =
            test_support::subscription(user_id, plan_id, SubscriptionStatus::Cancelled, end, false);
        let mut subscriptions = MockSubscriptionRepository::new();
        let mut reads = 0;
        subscriptions.expect_find_by_user_id().times(2).returning(move |_| {
            reads += 1;
            if reads == 1 {
                Ok(Some(active.clone()))
            } else {
                Ok(Some(cancelled.clone()))
            }
        });
        subscriptions
            .expect_update_status()
            .with(eq(user_id), eq(SubscriptionStatus::Active), mockall::predicate::always())
            .returning(|_, _, _| Ok(None));

        let history = Arc::new(HistoryRecorder::new(
            Arc::new(MockSubscriptionHistoryRepository::new()),
            Arc::new(MockPlanRepository::new()),
        ));
        let err = SubscriptionUseCase::new(
            Arc::new(subscriptions),
            Arc::new(MockSubscriptionHistoryRepository::new()),
            history,
        )
        .pause(&user_ctx(user_id), None)
        .await
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "cannot pause a subscription that is cancelled"
        );
    }

    #[tokio::test]
    async fn history_is_scoped_to_the_caller() {
        let (store, user_id) = store_with(SubscriptionStatus::Active, true);
        let stranger = Uuid::new_v4();
        let usecase = usecase(&store);
        usecase.cancel(&user_ctx(user_id), None).await.unwrap();

        let mine = usecase
            .history(&user_ctx(user_id), PageRequest::default())
            .await
            .unwrap();
        let theirs = usecase
            .history(&user_ctx(stranger), PageRequest::default())
            .await
            .unwrap();

        assert_eq!(mine.total, 1);
        assert_eq!(mine.items[0].action, "cancelled");
        assert_eq!(theirs.total, 0);
    }

    #[tokio::test]
    async fn expiring_requires_operator_and_bounded_days() {
        let (store, _) = store_with(SubscriptionStatus::Active, true);
        let usecase = usecase(&store);

        let denied = usecase
            .expiring(&user_ctx(Uuid::new_v4()), None, PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(denied, SubscriptionError::PermissionDenied(_)));

        let out_of_range = usecase
            .expiring(&RequestContext::operator(), Some(31), PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(out_of_range, SubscriptionError::InvalidArgument(_)));

        let within_week = usecase
            .expiring(&RequestContext::operator(), None, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(within_week.total, 0);

        let within_fortnight = usecase
            .expiring(&RequestContext::operator(), Some(14), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(within_fortnight.total, 1);
    }
}
