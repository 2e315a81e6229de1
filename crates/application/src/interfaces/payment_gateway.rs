use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Payment request handed to the external provider. `source` identifies this service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePaymentRequest {
    pub order_id: String,
    pub user_id: Uuid,
    pub app_id: String,
    pub amount: f64,
    pub currency: String,
    pub method: String,
    pub subject: String,
    pub return_url: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedPayment {
    pub payment_id: String,
    #[serde(default)]
    pub pay_url: Option<String>,
    #[serde(default)]
    pub pay_code: Option<String>,
    #[serde(default)]
    pub pay_params: Option<serde_json::Value>,
}

#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    #[error("payment service address is not configured")]
    NotConfigured,

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentGatewayError>;
}

/// Stand-in used when no provider address is configured. Every call is a configuration error.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredPaymentGateway;

#[async_trait]
impl PaymentGateway for UnconfiguredPaymentGateway {
    async fn create_payment(
        &self,
        _request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentGatewayError> {
        Err(PaymentGatewayError::NotConfigured)
    }
}
