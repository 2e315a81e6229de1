use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Tag recorded on every history row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionAction {
    Created,
    Renewed,
    Upgraded,
    Paused,
    Resumed,
    Cancelled,
    Expired,
    EnabledAutoRenew,
    DisabledAutoRenew,
}

impl Display for SubscriptionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let action = match self {
            SubscriptionAction::Created => "created",
            SubscriptionAction::Renewed => "renewed",
            SubscriptionAction::Upgraded => "upgraded",
            SubscriptionAction::Paused => "paused",
            SubscriptionAction::Resumed => "resumed",
            SubscriptionAction::Cancelled => "cancelled",
            SubscriptionAction::Expired => "expired",
            SubscriptionAction::EnabledAutoRenew => "enabled_auto_renew",
            SubscriptionAction::DisabledAutoRenew => "disabled_auto_renew",
        };
        write!(f, "{}", action)
    }
}
