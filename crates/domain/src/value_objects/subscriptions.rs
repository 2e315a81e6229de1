use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::{
        subscription_histories::SubscriptionHistoryEntity,
        subscription_orders::SubscriptionOrderEntity, subscriptions::SubscriptionEntity,
    },
    value_objects::{
        enums::{payment_statuses::PaymentStatus, subscription_statuses::SubscriptionStatus},
        subscription_lifecycle::effective_status,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionModel {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub app_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: SubscriptionStatus,
    pub auto_renew: bool,
    pub order_id: Option<String>,
}

impl SubscriptionModel {
    /// Owner-facing view; status is the read-time effective status.
    pub fn from_entity(entity: SubscriptionEntity, now: DateTime<Utc>) -> Self {
        let status = effective_status(&entity, now);
        Self {
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            app_id: entity.app_id,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status,
            auto_renew: entity.auto_renew,
            order_id: entity.order_id,
        }
    }
}

impl From<SubscriptionEntity> for SubscriptionModel {
    /// Stored view, used by operator listings.
    fn from(entity: SubscriptionEntity) -> Self {
        let status = entity.status();
        Self {
            user_id: entity.user_id,
            plan_id: entity.plan_id,
            app_id: entity.app_id,
            start_time: entity.start_time,
            end_time: entity.end_time,
            status,
            auto_renew: entity.auto_renew,
            order_id: entity.order_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionHistoryModel {
    pub id: i64,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub plan_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionHistoryEntity> for SubscriptionHistoryModel {
    fn from(value: SubscriptionHistoryEntity) -> Self {
        Self {
            id: value.subscription_history_id,
            user_id: value.user_id,
            plan_id: value.plan_id,
            plan_name: value.plan_name,
            start_time: value.start_time,
            end_time: value.end_time,
            status: value.status,
            action: value.action,
            created_at: value.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderModel {
    pub plan_id: Uuid,
    pub payment_method: String,
    /// Pricing region; detected from the caller when absent.
    #[serde(default)]
    pub region: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionOrderModel {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub amount: f64,
    pub currency: String,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<SubscriptionOrderEntity> for SubscriptionOrderModel {
    fn from(value: SubscriptionOrderEntity) -> Self {
        let payment_status = PaymentStatus::from_column(&value.payment_status);
        Self {
            order_id: value.order_id,
            payment_id: value.payment_id,
            user_id: value.user_id,
            plan_id: value.plan_id,
            amount: value.amount,
            currency: value.currency,
            payment_status,
            created_at: value.created_at,
        }
    }
}

/// Order plus whatever the client needs to finish paying.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedOrderModel {
    pub order: SubscriptionOrderModel,
    pub payment_id: String,
    pub pay_url: Option<String>,
    pub pay_code: Option<String>,
    pub pay_params: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoRenewOutcome {
    Renewed,
    DryRun,
    AlreadyRenewed,
    LockBusy,
    /// Cancelled, paused or auto-renew switched off after the candidate query.
    NotEligible,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoRenewResult {
    pub user_id: Uuid,
    pub plan_id: Uuid,
    pub outcome: AutoRenewOutcome,
    pub success: bool,
    pub order_id: Option<String>,
    pub payment_id: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AutoRenewReport {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    pub skipped: usize,
    pub dry_run: bool,
    pub results: Vec<AutoRenewResult>,
}

impl AutoRenewReport {
    pub fn push(&mut self, result: AutoRenewResult) {
        match result.outcome {
            AutoRenewOutcome::Renewed | AutoRenewOutcome::DryRun => self.success += 1,
            AutoRenewOutcome::Failed => self.failed += 1,
            AutoRenewOutcome::AlreadyRenewed
            | AutoRenewOutcome::LockBusy
            | AutoRenewOutcome::NotEligible => self.skipped += 1,
        }
        self.results.push(result);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpirySweepReport {
    pub count: usize,
    pub user_ids: Vec<Uuid>,
}
