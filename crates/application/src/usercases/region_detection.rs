use std::{
    net::{IpAddr, Ipv4Addr, Ipv6Addr},
    sync::Arc,
};
use tracing::{info, warn};

use domain::value_objects::regions::{DEFAULT_REGION, country_from_language};

use crate::{context::RequestContext, interfaces::passport::PassportClient};

/// Best-guess country for pricing: profile, geo-IP, `Accept-Language`, `X-Language`, then
/// `"default"`. Never fails.
pub struct RegionDetector {
    passport_client: Arc<dyn PassportClient>,
}

impl RegionDetector {
    pub fn new(passport_client: Arc<dyn PassportClient>) -> Self {
        Self { passport_client }
    }

    pub async fn detect_region(&self, ctx: &RequestContext) -> String {
        if let Some(user_id) = ctx.user_id {
            match self.passport_client.get_user_country_code(user_id).await {
                Ok(Some(code)) if !code.trim().is_empty() => {
                    info!(%user_id, country_code = %code, "region: detected from user profile");
                    return code.trim().to_string();
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(%user_id, error = ?err, "region: passport profile lookup failed");
                }
            }
        }

        if let Some(ip) = ctx.client_ip.as_deref().filter(|ip| is_public_ip(ip)) {
            match self.passport_client.get_country_code_by_ip(ip.to_string()).await {
                Ok(Some(code)) if !code.trim().is_empty() => {
                    info!(client_ip = %ip, country_code = %code, "region: detected from geo-ip");
                    return code.trim().to_string();
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(client_ip = %ip, error = ?err, "region: passport geo-ip lookup failed");
                }
            }
        }

        for (source, header) in [
            ("accept-language", ctx.accept_language.as_deref()),
            ("x-language", ctx.x_language.as_deref()),
        ] {
            if let Some(code) = header.and_then(country_from_language) {
                info!(source, country_code = %code, "region: detected from language header");
                return code.to_string();
            }
        }

        info!("region: using default region");
        DEFAULT_REGION.to_string()
    }
}

/// Globally routable addresses only; loopback, private, link-local and similar ranges are
/// meaningless to geo-ip.
pub fn is_public_ip(raw: &str) -> bool {
    match raw.trim().parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => is_public_v4(ip),
        Ok(IpAddr::V6(ip)) => match ip.to_ipv4_mapped() {
            Some(v4) => is_public_v4(v4),
            None => is_public_v6(ip),
        },
        Err(_) => false,
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    !(ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
        || ip.is_unspecified()
        || ip.is_multicast()
        // 100.64.0.0/10 carrier-grade NAT
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64))
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let first = ip.segments()[0];
    !(ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        || (first & 0xfe00) == 0xfc00
        || (first & 0xffc0) == 0xfe80)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::passport::{EmptyPassportClient, MockPassportClient};
    use mockall::predicate::eq;
    use uuid::Uuid;

    #[test]
    fn public_ip_filter() {
        assert!(is_public_ip("8.8.8.8"));
        assert!(is_public_ip("2001:4860:4860::8888"));
        assert!(!is_public_ip("10.1.2.3"));
        assert!(!is_public_ip("127.0.0.1"));
        assert!(!is_public_ip("100.64.0.1"));
        assert!(!is_public_ip("fd00::1"));
        assert!(!is_public_ip("not-an-ip"));
    }

    #[tokio::test]
    async fn profile_country_takes_priority() {
        let user_id = Uuid::new_v4();
        let mut passport = MockPassportClient::new();
        passport
            .expect_get_user_country_code()
            .with(eq(user_id))
            .returning(|_| Ok(Some("JP".to_string())));
        passport.expect_get_country_code_by_ip().never();

        let ctx = RequestContext {
            user_id: Some(user_id),
            client_ip: Some("8.8.8.8".to_string()),
            accept_language: Some("de-DE".to_string()),
            ..RequestContext::default()
        };

        let region = RegionDetector::new(Arc::new(passport))
            .detect_region(&ctx)
            .await;

        assert_eq!(region, "JP");
    }

    #[tokio::test]
    async fn passport_errors_fall_through_to_language() {
        let mut passport = MockPassportClient::new();
        passport
            .expect_get_user_country_code()
            .returning(|_| Err(anyhow::anyhow!("timeout")));
        passport
            .expect_get_country_code_by_ip()
            .with(eq("8.8.8.8".to_string()))
            .returning(|_| Ok(None));

        let ctx = RequestContext {
            user_id: Some(Uuid::new_v4()),
            client_ip: Some("8.8.8.8".to_string()),
            accept_language: Some("zh-CN,zh;q=0.9".to_string()),
            ..RequestContext::default()
        };

        let region = RegionDetector::new(Arc::new(passport))
            .detect_region(&ctx)
            .await;

        assert_eq!(region, "CN");
    }

    #[tokio::test]
    async fn private_ip_is_not_sent_to_geo_ip() {
        let mut passport = MockPassportClient::new();
        passport.expect_get_country_code_by_ip().never();

        let ctx = RequestContext {
            client_ip: Some("192.168.1.10".to_string()),
            x_language: Some("ko".to_string()),
            ..RequestContext::default()
        };

        let region = RegionDetector::new(Arc::new(passport))
            .detect_region(&ctx)
            .await;

        assert_eq!(region, "KR");
    }

    #[tokio::test]
    async fn nothing_known_yields_default() {
        let region = RegionDetector::new(Arc::new(EmptyPassportClient))
            .detect_region(&RequestContext::default())
            .await;

        assert_eq!(region, "default");
    }
}
