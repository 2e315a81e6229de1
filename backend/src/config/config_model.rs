use domain::value_objects::regions::SupportedRegions;

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub shared: SharedConfig,
    pub auth: Auth,
    pub payment_webhook: PaymentWebhook,
}

/// Settings read by both the HTTP service and the worker.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    pub stage: Stage,
    pub database: Database,
    pub redis: Redis,
    pub external_services: ExternalServices,
    pub supported_regions: SupportedRegions,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Redis {
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalServices {
    pub payment_service_url: Option<String>,
    pub subscription_return_url: Option<String>,
    pub passport_service_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Auth {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentWebhook {
    /// Callbacks are refused while unset.
    pub secret: Option<String>,
}
