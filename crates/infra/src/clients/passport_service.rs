use anyhow::Result;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use application::interfaces::passport::PassportClient;

use crate::clients::{ensure_success, http_client, normalize_base_url};

#[derive(Debug, Deserialize)]
struct CountryCodeResponse {
    #[serde(default)]
    country_code: Option<String>,
}

/// Identity and geo-IP lookups against the passport service. 404 means "unknown".
pub struct PassportServiceClient {
    http: reqwest::Client,
    base_url: String,
}

impl PassportServiceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            http: http_client()?,
            base_url: normalize_base_url(base_url)?,
        })
    }

    async fn fetch_country_code(&self, url: String, context: &str) -> Result<Option<String>> {
        let resp = self.http.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = ensure_success(resp, "passport", context).await?;

        let body: CountryCodeResponse = resp.json().await?;
        Ok(body
            .country_code
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty()))
    }
}

#[async_trait]
impl PassportClient for PassportServiceClient {
    async fn get_user_country_code(&self, user_id: Uuid) -> Result<Option<String>> {
        self.fetch_country_code(
            format!("{}/v1/users/{}/country", self.base_url, user_id),
            "user country",
        )
        .await
    }

    async fn get_country_code_by_ip(&self, ip: String) -> Result<Option<String>> {
        self.fetch_country_code(format!("{}/v1/geoip/{}", self.base_url, ip), "geoip")
            .await
    }
}
