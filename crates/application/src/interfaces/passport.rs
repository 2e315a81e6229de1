use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Identity and geo lookups. `Ok(None)` is a valid answer and means "unknown".
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PassportClient: Send + Sync {
    async fn get_user_country_code(&self, user_id: Uuid) -> Result<Option<String>>;
    async fn get_country_code_by_ip(&self, ip: String) -> Result<Option<String>>;
}

#[derive(Debug, Default, Clone)]
pub struct EmptyPassportClient;

#[async_trait]
impl PassportClient for EmptyPassportClient {
    async fn get_user_country_code(&self, _user_id: Uuid) -> Result<Option<String>> {
        Ok(None)
    }

    async fn get_country_code_by_ip(&self, _ip: String) -> Result<Option<String>> {
        Ok(None)
    }
}
