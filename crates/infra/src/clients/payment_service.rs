use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use application::interfaces::payment_gateway::{
    CreatePaymentRequest, CreatedPayment, PaymentGateway, PaymentGatewayError,
};

use crate::clients::{ensure_success, http_client, normalize_base_url};

const APP_ID_HEADER: &str = "X-App-Id";

/// JSON client for the payment service.
pub struct PaymentServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PaymentServiceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn payments_url(&self) -> String {
        format!("{}/v1/payments", self.base_url)
    }
}

#[async_trait]
impl PaymentGateway for PaymentServiceClient {
    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<CreatedPayment, PaymentGatewayError> {
        let resp = self
            .http
            .post(self.payments_url())
            .header(APP_ID_HEADER, request.app_id.as_str())
            .json(&request)
            .send()
            .await
            .map_err(anyhow::Error::from)?;
        let resp = ensure_success(resp, "payment", "create payment").await?;

        let created: CreatedPayment = resp.json().await.map_err(anyhow::Error::from)?;
        debug!(
            order_id = %request.order_id,
            payment_id = %created.payment_id,
            "client: payment created"
        );

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payments_endpoint_is_versioned() {
        let client = PaymentServiceClient::new("https://payments.example.com/").unwrap();

        assert_eq!(
            client.payments_url(),
            "https://payments.example.com/v1/payments"
        );
    }
}
