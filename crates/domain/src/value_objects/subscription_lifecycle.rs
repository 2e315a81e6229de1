use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use thiserror::Error;

use crate::{
    entities::{
        subscription_orders::SubscriptionOrderEntity,
        subscriptions::{
            SubscriptionEntity, UpdateSubscriptionStatusEntity, UpsertSubscriptionEntity,
        },
    },
    value_objects::enums::{
        subscription_actions::SubscriptionAction, subscription_statuses::SubscriptionStatus,
    },
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionOperation {
    Cancel,
    Pause,
    Resume,
    SetAutoRenew,
    Expire,
}

impl Display for SubscriptionOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let operation = match self {
            SubscriptionOperation::Cancel => "cancel",
            SubscriptionOperation::Pause => "pause",
            SubscriptionOperation::Resume => "resume",
            SubscriptionOperation::SetAutoRenew => "set auto-renew on",
            SubscriptionOperation::Expire => "expire",
        };
        write!(f, "{}", operation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionEvent {
    Cancel,
    Pause,
    Resume,
    SetAutoRenew(bool),
    Expire,
}

impl SubscriptionEvent {
    pub fn operation(&self) -> SubscriptionOperation {
        match self {
            SubscriptionEvent::Cancel => SubscriptionOperation::Cancel,
            SubscriptionEvent::Pause => SubscriptionOperation::Pause,
            SubscriptionEvent::Resume => SubscriptionOperation::Resume,
            SubscriptionEvent::SetAutoRenew(_) => SubscriptionOperation::SetAutoRenew,
            SubscriptionEvent::Expire => SubscriptionOperation::Expire,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {operation} a subscription that is {status}")]
pub struct InvalidTransition {
    pub operation: SubscriptionOperation,
    pub status: SubscriptionStatus,
}

/// Outcome of a permitted event: the status and auto-renew flag to persist plus the history tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: SubscriptionStatus,
    pub to: SubscriptionStatus,
    pub auto_renew: bool,
    pub action: SubscriptionAction,
}

impl Transition {
    pub fn to_update_entity(&self, now: DateTime<Utc>) -> UpdateSubscriptionStatusEntity {
        UpdateSubscriptionStatusEntity {
            status: self.to.to_string(),
            auto_renew: self.auto_renew,
            updated_at: now,
        }
    }
}

pub fn transition(
    subscription: &SubscriptionEntity,
    event: SubscriptionEvent,
    now: DateTime<Utc>,
) -> Result<Transition, InvalidTransition> {
    let from = subscription.status();
    let rejected = InvalidTransition {
        operation: event.operation(),
        status: from,
    };

    let (to, auto_renew, action) = match (event, from) {
        (SubscriptionEvent::Cancel, SubscriptionStatus::Active | SubscriptionStatus::Paused) => (
            SubscriptionStatus::Cancelled,
            false,
            SubscriptionAction::Cancelled,
        ),
        (SubscriptionEvent::Pause, SubscriptionStatus::Active) => (
            SubscriptionStatus::Paused,
            subscription.auto_renew,
            SubscriptionAction::Paused,
        ),
        (SubscriptionEvent::Resume, SubscriptionStatus::Paused) => (
            SubscriptionStatus::Active,
            subscription.auto_renew,
            SubscriptionAction::Resumed,
        ),
        (SubscriptionEvent::SetAutoRenew(enabled), SubscriptionStatus::Active) => {
            let action = if enabled {
                SubscriptionAction::EnabledAutoRenew
            } else {
                SubscriptionAction::DisabledAutoRenew
            };
            (SubscriptionStatus::Active, enabled, action)
        }
        (SubscriptionEvent::Expire, SubscriptionStatus::Active) if subscription.end_time < now => (
            SubscriptionStatus::Expired,
            subscription.auto_renew,
            SubscriptionAction::Expired,
        ),
        _ => return Err(rejected),
    };

    Ok(Transition {
        from,
        to,
        auto_renew,
        action,
    })
}

/// Status shown to the owner: an `active` row whose end time has passed reads as `expired`.
/// Nothing is persisted; the expiry sweep owns the stored transition.
pub fn effective_status(subscription: &SubscriptionEntity, now: DateTime<Utc>) -> SubscriptionStatus {
    let stored = subscription.status();
    if stored == SubscriptionStatus::Active && subscription.end_time < now {
        SubscriptionStatus::Expired
    } else {
        stored
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionPeriod {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subscription period of {duration_days} days overflows the supported date range")]
pub struct PeriodOverflow {
    pub duration_days: i32,
}

/// Lapsed subscriptions restart at `now`; live ones stack the new days onto the current end.
pub fn next_period(
    existing: Option<&SubscriptionEntity>,
    duration_days: i32,
    now: DateTime<Utc>,
) -> Result<SubscriptionPeriod, PeriodOverflow> {
    let duration = Duration::days(i64::from(duration_days));

    let (start_time, from) = match existing {
        Some(current) if current.end_time >= now => (current.start_time, current.end_time),
        _ => (now, now),
    };
    let end_time = from
        .checked_add_signed(duration)
        .ok_or(PeriodOverflow { duration_days })?;

    Ok(SubscriptionPeriod {
        start_time,
        end_time,
    })
}

/// Row to write once `order` is paid. The purchased plan replaces the previous one and the
/// auto-renew flag of an existing row is kept.
pub fn apply_paid_order(
    order: &SubscriptionOrderEntity,
    duration_days: i32,
    existing: Option<&SubscriptionEntity>,
    now: DateTime<Utc>,
) -> Result<(UpsertSubscriptionEntity, SubscriptionAction), PeriodOverflow> {
    let period = next_period(existing, duration_days, now)?;
    let (auto_renew, action) = match existing {
        Some(current) => (current.auto_renew, SubscriptionAction::Renewed),
        None => (false, SubscriptionAction::Created),
    };

    let upsert = UpsertSubscriptionEntity {
        user_id: order.user_id,
        plan_id: order.plan_id,
        app_id: order.app_id.clone(),
        start_time: period.start_time,
        end_time: period.end_time,
        status: SubscriptionStatus::Active.to_string(),
        auto_renew,
        order_id: Some(order.order_id.clone()),
        updated_at: now,
    };

    Ok((upsert, action))
}
