use chrono::{Duration, Utc};
use std::{sync::Arc, time::Duration as StdDuration};
use tracing::{error, info, warn};

use domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::subscription_statuses::SubscriptionStatus,
        subscriptions::{AutoRenewOutcome, AutoRenewReport, AutoRenewResult},
    },
};

use crate::{
    context::RequestContext,
    errors::UseCaseResult,
    interfaces::distributed_lock::{DistributedLock, LockHandle},
    usercases::{orders::OrderUseCase, payments::PaymentReconciliationUseCase},
};

pub const DEFAULT_DAYS_BEFORE_EXPIRY: i64 = 3;
pub const MAX_DAYS_BEFORE_EXPIRY: i64 = 30;
pub const LOCK_TTL: StdDuration = StdDuration::from_secs(10 * 60);

pub fn lock_key(user_id: uuid::Uuid) -> String {
    format!("auto_renew_lock:user:{}", user_id)
}

/// Out-of-range or missing lookahead falls back to the default.
pub fn normalize_days(days: Option<i64>) -> i64 {
    match days {
        Some(days) if (1..=MAX_DAYS_BEFORE_EXPIRY).contains(&days) => days,
        _ => DEFAULT_DAYS_BEFORE_EXPIRY,
    }
}

/// Held per-user lock. Released explicitly on the normal path; if the owning future is dropped
/// first, the release is spawned onto the current runtime instead of waiting out the TTL.
struct HeldLock {
    lock: Arc<dyn DistributedLock>,
    handle: Option<LockHandle>,
}

impl HeldLock {
    async fn release(mut self) {
        if let Some(handle) = self.handle.take() {
            release_lock(self.lock.as_ref(), handle).await;
        }
    }
}

impl Drop for HeldLock {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let lock = Arc::clone(&self.lock);
                runtime.spawn(async move { release_lock(lock.as_ref(), handle).await });
            }
            Err(_) => {
                warn!(key = %handle.key, "auto_renew: no runtime to release lock, left to expire");
            }
        }
    }
}

async fn release_lock(lock: &dyn DistributedLock, handle: LockHandle) {
    let key = handle.key.clone();
    if let Err(err) = lock.release(handle).await {
        warn!(%key, error = ?err, "auto_renew: failed to release lock");
    }
}

pub struct AutoRenewalUseCase {
    subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
    orders: Arc<OrderUseCase>,
    payments: Arc<PaymentReconciliationUseCase>,
    lock: Arc<dyn DistributedLock>,
}

impl AutoRenewalUseCase {
    pub fn new(
        subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync>,
        orders: Arc<OrderUseCase>,
        payments: Arc<PaymentReconciliationUseCase>,
        lock: Arc<dyn DistributedLock>,
    ) -> Self {
        Self {
            subscription_repository,
            orders,
            payments,
            lock,
        }
    }

    /// Operator-triggered run.
    pub async fn trigger(
        &self,
        ctx: &RequestContext,
        days: Option<i64>,
        dry_run: bool,
    ) -> UseCaseResult<AutoRenewReport> {
        ctx.require_operator()?;
        self.process_auto_renewals(days, dry_run).await
    }

    /// Renews every active auto-renewing subscription ending within the lookahead. One user's
    /// failure never aborts the batch; it is reported in the result list instead.
    pub async fn process_auto_renewals(
        &self,
        days: Option<i64>,
        dry_run: bool,
    ) -> UseCaseResult<AutoRenewReport> {
        let days = normalize_days(days);
        let now = Utc::now();

        let candidates = self
            .subscription_repository
            .list_auto_renew_due(now, now + Duration::days(days))
            .await?;

        info!(days, dry_run, candidates = candidates.len(), "auto_renew: batch started");

        let mut report = AutoRenewReport {
            total: candidates.len(),
            dry_run,
            ..AutoRenewReport::default()
        };

        for candidate in candidates {
            let result = self.renew_one(&candidate, dry_run).await;
            if result.outcome == AutoRenewOutcome::Failed {
                error!(
                    user_id = %result.user_id,
                    order_id = result.order_id.as_deref().unwrap_or(""),
                    message = result.message.as_deref().unwrap_or(""),
                    "auto_renew: renewal failed"
                );
            }
            report.push(result);
        }

        info!(
            total = report.total,
            success = report.success,
            failed = report.failed,
            skipped = report.skipped,
            dry_run,
            "auto_renew: batch finished"
        );

        Ok(report)
    }

    async fn renew_one(&self, snapshot: &SubscriptionEntity, dry_run: bool) -> AutoRenewResult {
        let key = lock_key(snapshot.user_id);

        let handle = match self.lock.try_acquire(key.clone(), LOCK_TTL).await {
            Ok(Some(handle)) => handle,
            Ok(None) => {
                info!(user_id = %snapshot.user_id, "auto_renew: lock busy, skipping");
                return outcome(
                    snapshot,
                    AutoRenewOutcome::LockBusy,
                    "failed to acquire lock or already processing",
                );
            }
            Err(err) => {
                warn!(
                    user_id = %snapshot.user_id,
                    %key,
                    error = ?err,
                    "auto_renew: lock unavailable, skipping"
                );
                return outcome(
                    snapshot,
                    AutoRenewOutcome::LockBusy,
                    format!("failed to acquire lock: {}", err),
                );
            }
        };
        let held = HeldLock {
            lock: Arc::clone(&self.lock),
            handle: Some(handle),
        };

        let result = self.renew_locked(snapshot, dry_run).await;
        held.release().await;

        result
    }

    async fn renew_locked(&self, snapshot: &SubscriptionEntity, dry_run: bool) -> AutoRenewResult {
        let current = match self
            .subscription_repository
            .find_by_user_id(snapshot.user_id)
            .await
        {
            Ok(Some(current)) => current,
            Ok(None) => {
                return outcome(
                    snapshot,
                    AutoRenewOutcome::NotEligible,
                    "subscription no longer exists",
                );
            }
            Err(err) => {
                return outcome(
                    snapshot,
                    AutoRenewOutcome::Failed,
                    format!("failed to reload subscription: {}", err),
                );
            }
        };

        if current.end_time > snapshot.end_time {
            info!(user_id = %snapshot.user_id, "auto_renew: already renewed by another run");
            return outcome(snapshot, AutoRenewOutcome::AlreadyRenewed, "already renewed");
        }
        if current.status() != SubscriptionStatus::Active || !current.auto_renew {
            return outcome(
                snapshot,
                AutoRenewOutcome::NotEligible,
                format!(
                    "subscription is {} with auto-renew {}",
                    current.status,
                    if current.auto_renew { "on" } else { "off" }
                ),
            );
        }

        if dry_run {
            return outcome(snapshot, AutoRenewOutcome::DryRun, "dry run - not executed");
        }

        let ctx = RequestContext::system(current.user_id, current.app_id.clone());
        let created = match self
            .orders
            .create_renewal_order(&ctx, current.plan_id)
            .await
        {
            Ok(created) => created,
            Err(err) => {
                return outcome(
                    snapshot,
                    AutoRenewOutcome::Failed,
                    format!("failed to create order: {}", err),
                );
            }
        };

        let order_id = created.order.order_id.clone();
        let mut result = match self
            .payments
            .handle_payment_success(&order_id, Some(created.order.amount))
            .await
        {
            Ok(_) => {
                info!(user_id = %current.user_id, %order_id, "auto_renew: renewed");
                outcome(snapshot, AutoRenewOutcome::Renewed, "renewed")
            }
            Err(err) => outcome(
                snapshot,
                AutoRenewOutcome::Failed,
                format!("order created but payment failed: {}", err),
            ),
        };
        result.order_id = Some(order_id);
        result.payment_id = Some(created.payment_id);
        result
    }
}

fn outcome(
    snapshot: &SubscriptionEntity,
    outcome: AutoRenewOutcome,
    message: impl Into<String>,
) -> AutoRenewResult {
    AutoRenewResult {
        user_id: snapshot.user_id,
        plan_id: snapshot.plan_id,
        outcome,
        success: matches!(outcome, AutoRenewOutcome::Renewed | AutoRenewOutcome::DryRun),
        order_id: None,
        payment_id: None,
        message: Some(message.into()),
    }
}
