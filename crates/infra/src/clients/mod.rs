pub mod passport_service;
pub mod payment_service;

use anyhow::Result;
use std::time::Duration;
use tracing::error;
use url::Url;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?)
}

/// Validates the configured address and strips any trailing slash so paths can be appended.
pub(crate) fn normalize_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())?;
    Ok(url.as_str().trim_end_matches('/').to_string())
}

pub(crate) async fn ensure_success(
    resp: reqwest::Response,
    service: &str,
    context: &str,
) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status();
    let body = match resp.text().await {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => "<empty response body>".to_string(),
        Err(err) => format!("<failed to read response body: {err}>"),
    };

    error!(
        %status,
        response_body = %body,
        %service,
        %context,
        "client: upstream request failed"
    );

    anyhow::bail!("{} request failed: {} (status {})", service, context, status);
}
