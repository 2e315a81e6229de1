use anyhow::{Context, Result};
use std::{env, str::FromStr};

use domain::value_objects::regions::SupportedRegions;

use super::{
    config_model::{
        Auth, BackendServer, Database, DotEnvyConfig, ExternalServices, PaymentWebhook, Redis,
        SharedConfig,
    },
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parse("SERVER_PORT_BACKEND")?,
        body_limit: required_parse("SERVER_BODY_LIMIT")?,
        timeout: required_parse("SERVER_TIMEOUT")?,
    };

    let auth = Auth {
        jwt_secret: required("JWT_SECRET")?,
    };

    let payment_webhook = PaymentWebhook {
        secret: optional("PAYMENT_WEBHOOK_SECRET"),
    };

    Ok(DotEnvyConfig {
        backend_server,
        shared: load_shared()?,
        auth,
        payment_webhook,
    })
}

pub fn load_shared() -> Result<SharedConfig> {
    dotenvy::dotenv().ok();

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let redis = Redis {
        url: required("REDIS_URL")?,
    };

    let external_services = ExternalServices {
        payment_service_url: optional("PAYMENT_SERVICE_URL"),
        subscription_return_url: optional("SUBSCRIPTION_RETURN_URL"),
        passport_service_url: optional("PASSPORT_SERVICE_URL"),
    };

    let supported_regions = match optional("SUPPORTED_REGIONS") {
        Some(raw) => SupportedRegions::parse(&raw),
        None => SupportedRegions::default(),
    };

    Ok(SharedConfig {
        stage: get_stage(),
        database,
        redis,
        external_services,
        supported_regions,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = env::var("STAGE").unwrap_or_default();
    Stage::try_from(stage_str.as_str()).unwrap_or_default()
}

pub fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{} is invalid", key))
}

pub fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn required_parse<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse::<T>()
        .with_context(|| format!("{} is invalid", key))
}

pub fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{} is invalid", key)),
        None => Ok(default),
    }
}
