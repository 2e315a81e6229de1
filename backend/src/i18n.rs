use std::collections::HashMap;

use application::errors::{SubscriptionError, codes};
use domain::value_objects::{
    enums::subscription_statuses::SubscriptionStatus,
    subscription_lifecycle::{InvalidTransition, SubscriptionOperation},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    fn from_tag(tag: &str) -> Option<Self> {
        let first = tag.split(',').next()?.split(';').next()?.trim();
        let base = first.split(['-', '_']).next()?.to_ascii_lowercase();

        match base.as_str() {
            "zh" => Some(Language::Zh),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    /// `X-Language` wins over `Accept-Language`; anything unrecognised means English.
    pub fn negotiate(x_language: Option<&str>, accept_language: Option<&str>) -> Self {
        x_language
            .and_then(Language::from_tag)
            .or_else(|| accept_language.and_then(Language::from_tag))
            .unwrap_or_default()
    }
}

struct Messages {
    en: &'static str,
    zh: &'static str,
}

/// Localized client-facing messages keyed by error code.
pub struct Translator {
    messages: HashMap<u32, Messages>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator {
    pub fn new() -> Self {
        let entries = [
            (codes::INTERNAL, "Internal server error", "服务器内部错误"),
            (codes::INVALID_ARGUMENT, "Invalid argument", "参数错误"),
            (codes::CONFIGURATION, "Service is not configured", "服务未配置"),
            (codes::PERMISSION_DENIED, "Permission denied", "无权限访问"),
            (codes::PLAN_NOT_FOUND, "Plan not found", "套餐不存在"),
            (
                codes::PLAN_PRICE_INVALID,
                "Plan price must not be negative",
                "套餐价格不能为负数",
            ),
            (codes::PLAN_PRICING_NOT_FOUND, "Plan pricing not found", "套餐定价不存在"),
            (codes::SUBSCRIPTION_NOT_FOUND, "Subscription not found", "订阅不存在"),
            (codes::ORDER_NOT_FOUND, "Order not found", "订单不存在"),
            (codes::ORDER_CREATE_FAILED, "Failed to create order", "创建订单失败"),
            (codes::PAYMENT_FAILED, "Payment service call failed", "支付服务调用失败"),
        ];

        let messages = entries
            .into_iter()
            .map(|(code, en, zh)| (code, Messages { en, zh }))
            .collect();

        Self { messages }
    }

    pub fn message(&self, err: &SubscriptionError, language: Language) -> String {
        match err {
            SubscriptionError::InvalidStateTransition(transition) => {
                transition_message(transition, language)
            }
            SubscriptionError::InvalidArgument(detail) => {
                format!("{}: {}", self.lookup(err.code(), language), detail)
            }
            _ => self.lookup(err.code(), language).to_string(),
        }
    }

    fn lookup(&self, code: u32, language: Language) -> &'static str {
        let messages = self
            .messages
            .get(&code)
            .or_else(|| self.messages.get(&codes::INTERNAL));

        match (messages, language) {
            (Some(m), Language::En) => m.en,
            (Some(m), Language::Zh) => m.zh,
            (None, _) => "Internal server error",
        }
    }
}

fn transition_message(transition: &InvalidTransition, language: Language) -> String {
    match language {
        Language::En => format!(
            "Cannot {} a subscription that is {}",
            transition.operation, transition.status
        ),
        Language::Zh => format!(
            "无法{}状态为{}的订阅",
            operation_zh(transition.operation),
            status_zh(transition.status)
        ),
    }
}

fn operation_zh(operation: SubscriptionOperation) -> &'static str {
    match operation {
        SubscriptionOperation::Cancel => "取消",
        SubscriptionOperation::Pause => "暂停",
        SubscriptionOperation::Resume => "恢复",
        SubscriptionOperation::SetAutoRenew => "开启自动续费",
        SubscriptionOperation::Expire => "过期处理",
    }
}

fn status_zh(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "生效中",
        SubscriptionStatus::Paused => "已暂停",
        SubscriptionStatus::Cancelled => "已取消",
        SubscriptionStatus::Expired => "已过期",
    }
}
