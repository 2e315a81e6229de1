use domain::value_objects::subscription_lifecycle::{InvalidTransition, SubscriptionOperation};
use thiserror::Error;

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Stable numeric codes surfaced to clients.
pub mod codes {
    pub const INTERNAL: u32 = 130001;
    pub const INVALID_ARGUMENT: u32 = 130002;
    pub const CONFIGURATION: u32 = 130003;
    pub const PERMISSION_DENIED: u32 = 130004;

    pub const PLAN_NOT_FOUND: u32 = 130101;
    pub const PLAN_PRICE_INVALID: u32 = 130102;
    pub const PLAN_PRICING_NOT_FOUND: u32 = 130103;

    pub const SUBSCRIPTION_NOT_FOUND: u32 = 130201;
    pub const CANNOT_CANCEL_STATUS: u32 = 130206;
    pub const CANNOT_PAUSE_STATUS: u32 = 130207;
    pub const CANNOT_RESUME_STATUS: u32 = 130208;
    pub const CANNOT_SET_AUTO_RENEW: u32 = 130209;
    pub const CANNOT_EXPIRE_STATUS: u32 = 130210;

    pub const ORDER_NOT_FOUND: u32 = 130301;
    pub const ORDER_CREATE_FAILED: u32 = 130303;

    pub const PAYMENT_FAILED: u32 = 130401;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    PermissionDenied,
    InvalidStateTransition,
    UpstreamFailure,
    ConfigurationError,
    Internal,
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("plan not found")]
    PlanNotFound,

    #[error("plan price must not be negative")]
    PlanPriceInvalid,

    #[error("plan pricing not found")]
    PlanPricingNotFound,

    #[error("subscription not found")]
    SubscriptionNotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    InvalidStateTransition(#[from] InvalidTransition),

    #[error("failed to create order: {0}")]
    OrderCreateFailed(#[source] anyhow::Error),

    #[error("payment service call failed: {0}")]
    PaymentFailed(#[source] anyhow::Error),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn code(&self) -> u32 {
        match self {
            SubscriptionError::PlanNotFound => codes::PLAN_NOT_FOUND,
            SubscriptionError::PlanPriceInvalid => codes::PLAN_PRICE_INVALID,
            SubscriptionError::PlanPricingNotFound => codes::PLAN_PRICING_NOT_FOUND,
            SubscriptionError::SubscriptionNotFound => codes::SUBSCRIPTION_NOT_FOUND,
            SubscriptionError::OrderNotFound => codes::ORDER_NOT_FOUND,
            SubscriptionError::InvalidArgument(_) => codes::INVALID_ARGUMENT,
            SubscriptionError::PermissionDenied(_) => codes::PERMISSION_DENIED,
            SubscriptionError::InvalidStateTransition(err) => match err.operation {
                SubscriptionOperation::Cancel => codes::CANNOT_CANCEL_STATUS,
                SubscriptionOperation::Pause => codes::CANNOT_PAUSE_STATUS,
                SubscriptionOperation::Resume => codes::CANNOT_RESUME_STATUS,
                SubscriptionOperation::SetAutoRenew => codes::CANNOT_SET_AUTO_RENEW,
                SubscriptionOperation::Expire => codes::CANNOT_EXPIRE_STATUS,
            },
            SubscriptionError::OrderCreateFailed(_) => codes::ORDER_CREATE_FAILED,
            SubscriptionError::PaymentFailed(_) => codes::PAYMENT_FAILED,
            SubscriptionError::Configuration(_) => codes::CONFIGURATION,
            SubscriptionError::Internal(_) => codes::INTERNAL,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            SubscriptionError::PlanNotFound
            | SubscriptionError::PlanPricingNotFound
            | SubscriptionError::SubscriptionNotFound
            | SubscriptionError::OrderNotFound => ErrorKind::NotFound,
            SubscriptionError::PlanPriceInvalid | SubscriptionError::InvalidArgument(_) => {
                ErrorKind::InvalidArgument
            }
            SubscriptionError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            SubscriptionError::InvalidStateTransition(_) => ErrorKind::InvalidStateTransition,
            SubscriptionError::PaymentFailed(_) => ErrorKind::UpstreamFailure,
            SubscriptionError::Configuration(_) => ErrorKind::ConfigurationError,
            SubscriptionError::OrderCreateFailed(_) | SubscriptionError::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SubscriptionError::InvalidArgument(message.into())
    }
}
