use std::{future::Future, sync::Arc, time::Duration};

use application::{
    context::RequestContext,
    errors::UseCaseResult,
    usercases::{
        auto_renewal::AutoRenewalUseCase, expiry_sweeper::ExpirySweeperUseCase,
        subscriptions::SubscriptionUseCase,
    },
};
use backend::wiring::Services;
use domain::value_objects::{
    pagination::{MAX_PAGE_SIZE, PageRequest},
    subscriptions::{AutoRenewReport, ExpirySweepReport},
};
use tracing::{error, info, warn};

use crate::config::config_model::JobSettings;

pub const EXPIRY_CHECK_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const RENEWAL_REMINDER_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const AUTO_RENEWAL_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// The three scheduled subscription jobs. Each run is independent; a failed run is logged and
/// the next tick starts fresh.
#[derive(Clone)]
pub struct SubscriptionJobs {
    subscriptions: Arc<SubscriptionUseCase>,
    expiry_sweeper: Arc<ExpirySweeperUseCase>,
    auto_renewal: Arc<AutoRenewalUseCase>,
    settings: JobSettings,
}

impl SubscriptionJobs {
    pub fn new(services: &Services, settings: JobSettings) -> Self {
        Self {
            subscriptions: Arc::clone(&services.subscriptions),
            expiry_sweeper: Arc::clone(&services.expiry_sweeper),
            auto_renewal: Arc::clone(&services.auto_renewal),
            settings,
        }
    }

    /// Expires lapsed subscriptions, then counts those due within the look-ahead window.
    /// A failed count does not discard the committed sweep.
    pub async fn expiry_check(&self) -> UseCaseResult<(ExpirySweepReport, Option<i64>)> {
        let report = self.expiry_sweeper.update_expired_subscriptions().await?;
        info!(
            expired = report.count,
            user_ids = ?report.user_ids,
            "Expired lapsed subscriptions"
        );

        let upcoming = match self
            .subscriptions
            .expiring(
                &RequestContext::operator(),
                Some(self.settings.expiry_check_days),
                PageRequest::new(Some(1), Some(1)),
            )
            .await
        {
            Ok(page) => Some(page.total),
            Err(err) => {
                warn!(error = ?err, "Counting upcoming expirations failed");
                None
            }
        };

        Ok((report, upcoming))
    }

    /// Logs every subscription ending within the reminder window; returns how many were seen.
    pub async fn renewal_reminder(&self) -> UseCaseResult<usize> {
        let ctx = RequestContext::operator();
        let mut page_number = 1;
        let mut reminded = 0;

        loop {
            let page = self
                .subscriptions
                .expiring(
                    &ctx,
                    Some(self.settings.renewal_reminder_days),
                    PageRequest::new(Some(page_number), Some(MAX_PAGE_SIZE)),
                )
                .await?;

            for subscription in &page.items {
                info!(
                    user_id = %subscription.user_id,
                    plan_id = %subscription.plan_id,
                    end_time = %subscription.end_time,
                    auto_renew = subscription.auto_renew,
                    "reminder: subscription due for renewal"
                );
            }
            reminded += page.items.len();

            if page.items.is_empty() || page_number * page.page_size >= page.total {
                break;
            }
            page_number += 1;
        }

        Ok(reminded)
    }

    pub async fn auto_renewal(&self) -> UseCaseResult<AutoRenewReport> {
        self.auto_renewal
            .process_auto_renewals(
                Some(self.settings.auto_renew_days_before),
                self.settings.auto_renew_dry_run,
            )
            .await
    }

    pub async fn run_expiry_check(&self) {
        info!("Running scheduled subscription expiry check");
        match bounded("expiry_check", EXPIRY_CHECK_TIMEOUT, self.expiry_check()).await {
            Some(Ok((report, upcoming))) => info!(
                expired = report.count,
                upcoming = ?upcoming,
                within_days = self.settings.expiry_check_days,
                "Subscription expiry check complete"
            ),
            Some(Err(err)) => error!(error = ?err, "Subscription expiry check failed"),
            None => {}
        }
    }

    pub async fn run_renewal_reminder(&self) {
        info!("Running scheduled renewal reminder");
        match bounded(
            "renewal_reminder",
            RENEWAL_REMINDER_TIMEOUT,
            self.renewal_reminder(),
        )
        .await
        {
            Some(Ok(count)) => info!(count, "Renewal reminder complete"),
            Some(Err(err)) => error!(error = ?err, "Renewal reminder failed"),
            None => {}
        }
    }

    pub async fn run_auto_renewal(&self) {
        info!("Running scheduled auto-renewal");
        match bounded("auto_renewal", AUTO_RENEWAL_TIMEOUT, self.auto_renewal()).await {
            Some(Ok(report)) => info!(
                total = report.total,
                success = report.success,
                failed = report.failed,
                skipped = report.skipped,
                dry_run = self.settings.auto_renew_dry_run,
                "Auto-renewal complete"
            ),
            Some(Err(err)) => error!(error = ?err, "Auto-renewal failed"),
            None => {}
        }
    }
}

async fn bounded<F, T>(job: &str, limit: Duration, fut: F) -> Option<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(output) => Some(output),
        Err(_) => {
            error!(job, timeout_secs = limit.as_secs(), "Scheduled job timed out");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use application::{
        interfaces::{
            distributed_lock::{DistributedLock, LockHandle},
            passport::EmptyPassportClient,
            payment_gateway::UnconfiguredPaymentGateway,
        },
        usercases::{
            history::HistoryRecorder,
            orders::{OrderSettings, OrderUseCase},
            payments::PaymentReconciliationUseCase,
            plans::PlanUseCase,
            pricing::PricingResolver,
            region_detection::RegionDetector,
        },
    };
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::{
            plan_pricings::MockPlanPricingRepository, plans::MockPlanRepository,
            subscription_histories::MockSubscriptionHistoryRepository,
            subscription_orders::MockSubscriptionOrderRepository,
            subscriptions::MockSubscriptionRepository,
        },
        value_objects::{pagination::Page, regions::SupportedRegions},
    };
    use uuid::Uuid;

    struct UnusedLock;

    #[async_trait]
    impl DistributedLock for UnusedLock {
        async fn try_acquire(&self, _key: String, _ttl: Duration) -> Result<Option<LockHandle>> {
            Ok(None)
        }

        async fn release(&self, _handle: LockHandle) -> Result<()> {
            Ok(())
        }
    }

    fn services_with(subscription_repository: MockSubscriptionRepository) -> Services {
        services_recording(
            subscription_repository,
            MockPlanRepository::new(),
            MockSubscriptionHistoryRepository::new(),
        )
    }

    fn services_recording(
        subscription_repository: MockSubscriptionRepository,
        plan_repository: MockPlanRepository,
        history_repository: MockSubscriptionHistoryRepository,
    ) -> Services {
        let subscription_repository = Arc::new(subscription_repository);
        let plan_repository = Arc::new(plan_repository);
        let plan_pricing_repository = Arc::new(MockPlanPricingRepository::new());
        let history_repository = Arc::new(history_repository);
        let history = Arc::new(HistoryRecorder::new(
            history_repository.clone(),
            plan_repository.clone(),
        ));

        let orders = Arc::new(OrderUseCase::new(
            Arc::new(PricingResolver::new(
                plan_repository.clone(),
                plan_pricing_repository.clone(),
                SupportedRegions::default(),
            )),
            Arc::new(RegionDetector::new(Arc::new(EmptyPassportClient))),
            plan_repository.clone(),
            Arc::new(MockSubscriptionOrderRepository::new()),
            Arc::new(UnconfiguredPaymentGateway),
            OrderSettings { return_url: None },
        ));
        let payments = Arc::new(PaymentReconciliationUseCase::new(
            subscription_repository.clone(),
            history.clone(),
        ));

        Services {
            plans: Arc::new(PlanUseCase::new(plan_repository, plan_pricing_repository)),
            subscriptions: Arc::new(SubscriptionUseCase::new(
                subscription_repository.clone(),
                history_repository,
                history.clone(),
            )),
            orders: orders.clone(),
            payments: payments.clone(),
            expiry_sweeper: Arc::new(ExpirySweeperUseCase::new(
                subscription_repository.clone(),
                history,
            )),
            auto_renewal: Arc::new(AutoRenewalUseCase::new(
                subscription_repository,
                orders,
                payments,
                Arc::new(UnusedLock),
            )),
        }
    }

    fn active_subscription() -> SubscriptionEntity {
        let now = Utc::now();
        SubscriptionEntity {
            user_subscription_id: 1,
            user_id: Uuid::new_v4(),
            plan_id: Uuid::new_v4(),
            app_id: "app-1".to_string(),
            start_time: now - ChronoDuration::days(25),
            end_time: now + ChronoDuration::days(2),
            status: "active".to_string(),
            auto_renew: true,
            order_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn expiry_check_reports_upcoming_count() {
        let mut subscription_repository = MockSubscriptionRepository::new();
        subscription_repository
            .expect_mark_expired()
            .times(1)
            .returning(|_| Ok(vec![]));
        subscription_repository
            .expect_list_expiring()
            .times(1)
            .returning(|_, _, page| Ok(Page::new(vec![], 4, page)));

        let jobs = SubscriptionJobs::new(
            &services_with(subscription_repository),
            JobSettings::default(),
        );

        let (report, upcoming) = jobs.expiry_check().await.unwrap();

        assert_eq!(report.count, 0);
        assert_eq!(upcoming, Some(4));
    }

    #[tokio::test]
    async fn expiry_check_keeps_the_sweep_when_counting_fails() {
        let lapsed = SubscriptionEntity {
            status: "expired".to_string(),
            ..active_subscription()
        };
        let user_id = lapsed.user_id;
        let mut subscription_repository = MockSubscriptionRepository::new();
        subscription_repository
            .expect_mark_expired()
            .times(1)
            .returning(move |_| Ok(vec![lapsed.clone()]));
        subscription_repository
            .expect_list_expiring()
            .times(1)
            .returning(|_, _, _| Err(anyhow::anyhow!("connection reset")));
        let mut plan_repository = MockPlanRepository::new();
        plan_repository.expect_find_by_id().returning(|_| Ok(None));
        let mut history_repository = MockSubscriptionHistoryRepository::new();
        history_repository
            .expect_append()
            .times(1)
            .returning(|_| Ok(()));

        let jobs = SubscriptionJobs::new(
            &services_recording(subscription_repository, plan_repository, history_repository),
            JobSettings::default(),
        );

        let (report, upcoming) = jobs.expiry_check().await.unwrap();

        assert_eq!(report.count, 1);
        assert_eq!(report.user_ids, vec![user_id]);
        assert_eq!(upcoming, None);
    }

    #[tokio::test]
    async fn renewal_reminder_walks_every_page() {
        let mut subscription_repository = MockSubscriptionRepository::new();
        subscription_repository
            .expect_list_expiring()
            .times(2)
            .returning(|_, _, page| {
                let count = if page.page == 1 { MAX_PAGE_SIZE as usize } else { 1 };
                let items = (0..count).map(|_| active_subscription()).collect();
                Ok(Page::new(items, MAX_PAGE_SIZE + 1, page))
            });

        let jobs = SubscriptionJobs::new(
            &services_with(subscription_repository),
            JobSettings::default(),
        );

        assert_eq!(jobs.renewal_reminder().await.unwrap(), 101);
    }

    #[tokio::test]
    async fn auto_renewal_with_no_candidates_is_empty() {
        let mut subscription_repository = MockSubscriptionRepository::new();
        subscription_repository
            .expect_list_auto_renew_due()
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let jobs = SubscriptionJobs::new(
            &services_with(subscription_repository),
            JobSettings::default(),
        );

        let report = jobs.auto_renewal().await.unwrap();

        assert_eq!(report.total, 0);
        assert!(report.results.is_empty());
    }
}
