use std::sync::Arc;

use anyhow::Result;
use application::{
    interfaces::{
        distributed_lock::DistributedLock,
        passport::{EmptyPassportClient, PassportClient},
        payment_gateway::{PaymentGateway, UnconfiguredPaymentGateway},
    },
    usercases::{
        auto_renewal::AutoRenewalUseCase,
        expiry_sweeper::ExpirySweeperUseCase,
        history::HistoryRecorder,
        orders::{OrderSettings, OrderUseCase},
        payments::PaymentReconciliationUseCase,
        plans::PlanUseCase,
        pricing::PricingResolver,
        region_detection::RegionDetector,
        subscriptions::SubscriptionUseCase,
    },
};
use domain::repositories::{
    plan_pricings::PlanPricingRepository, plans::PlanRepository,
    subscription_histories::SubscriptionHistoryRepository,
    subscription_orders::SubscriptionOrderRepository, subscriptions::SubscriptionRepository,
};
use infra::{
    clients::{passport_service::PassportServiceClient, payment_service::PaymentServiceClient},
    postgres::{
        postgres_connection::{self, PgPoolSquad},
        repositories::{
            plan_pricings::PlanPricingPostgres, plans::PlanPostgres,
            subscription_histories::SubscriptionHistoryPostgres,
            subscription_orders::SubscriptionOrderPostgres, subscriptions::SubscriptionPostgres,
        },
    },
    redis_store::{
        cached_subscriptions::CachedSubscriptionRepository,
        distributed_lock::RedisDistributedLock,
        redis_connection::{self, RedisPool},
        subscription_cache::RedisSubscriptionCache,
    },
};
use tracing::{info, warn};

use crate::config::config_model::SharedConfig;

/// Every usecase the service exposes, built once and shared by the HTTP routers and the worker.
#[derive(Clone)]
pub struct Services {
    pub plans: Arc<PlanUseCase>,
    pub subscriptions: Arc<SubscriptionUseCase>,
    pub orders: Arc<OrderUseCase>,
    pub payments: Arc<PaymentReconciliationUseCase>,
    pub expiry_sweeper: Arc<ExpirySweeperUseCase>,
    pub auto_renewal: Arc<AutoRenewalUseCase>,
}

pub async fn build_services(config: &SharedConfig) -> Result<Services> {
    let db_pool = postgres_connection::establish_connection(&config.database.url)?;
    info!("Postgres connection has been established");

    let redis_pool = redis_connection::establish_connection(&config.redis.url).await?;
    info!("Redis connection has been established");

    assemble(config, Arc::new(db_pool), redis_pool)
}

fn assemble(config: &SharedConfig, db_pool: Arc<PgPoolSquad>, redis_pool: RedisPool) -> Result<Services> {
    let plan_repository: Arc<dyn PlanRepository + Send + Sync> =
        Arc::new(PlanPostgres::new(Arc::clone(&db_pool)));
    let plan_pricing_repository: Arc<dyn PlanPricingRepository + Send + Sync> =
        Arc::new(PlanPricingPostgres::new(Arc::clone(&db_pool)));
    let order_repository: Arc<dyn SubscriptionOrderRepository + Send + Sync> =
        Arc::new(SubscriptionOrderPostgres::new(Arc::clone(&db_pool)));
    let history_repository: Arc<dyn SubscriptionHistoryRepository + Send + Sync> =
        Arc::new(SubscriptionHistoryPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository: Arc<dyn SubscriptionRepository + Send + Sync> =
        Arc::new(CachedSubscriptionRepository::new(
            Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool))),
            Arc::new(RedisSubscriptionCache::new(redis_pool.clone())),
        ));
    let lock: Arc<dyn DistributedLock> = Arc::new(RedisDistributedLock::new(redis_pool));

    let external = &config.external_services;
    let payment_gateway: Arc<dyn PaymentGateway> = match &external.payment_service_url {
        Some(url) => Arc::new(PaymentServiceClient::new(url)?),
        None => {
            warn!("wiring: PAYMENT_SERVICE_URL is not set, order creation is disabled");
            Arc::new(UnconfiguredPaymentGateway)
        }
    };
    let passport_client: Arc<dyn PassportClient> = match &external.passport_service_url {
        Some(url) => Arc::new(PassportServiceClient::new(url)?),
        None => {
            info!("wiring: PASSPORT_SERVICE_URL is not set, region detection uses headers only");
            Arc::new(EmptyPassportClient)
        }
    };

    let history = Arc::new(HistoryRecorder::new(
        Arc::clone(&history_repository),
        Arc::clone(&plan_repository),
    ));
    let pricing_resolver = Arc::new(PricingResolver::new(
        Arc::clone(&plan_repository),
        Arc::clone(&plan_pricing_repository),
        config.supported_regions.clone(),
    ));

    let plans = Arc::new(PlanUseCase::new(
        Arc::clone(&plan_repository),
        Arc::clone(&plan_pricing_repository),
    ));
    let subscriptions = Arc::new(SubscriptionUseCase::new(
        Arc::clone(&subscription_repository),
        history_repository,
        Arc::clone(&history),
    ));
    let orders = Arc::new(OrderUseCase::new(
        pricing_resolver,
        Arc::new(RegionDetector::new(passport_client)),
        plan_repository,
        order_repository,
        payment_gateway,
        OrderSettings {
            return_url: external.subscription_return_url.clone(),
        },
    ));
    let payments = Arc::new(PaymentReconciliationUseCase::new(
        Arc::clone(&subscription_repository),
        Arc::clone(&history),
    ));
    let expiry_sweeper = Arc::new(ExpirySweeperUseCase::new(
        Arc::clone(&subscription_repository),
        history,
    ));
    let auto_renewal = Arc::new(AutoRenewalUseCase::new(
        subscription_repository,
        Arc::clone(&orders),
        Arc::clone(&payments),
        lock,
    ));

    Ok(Services {
        plans,
        subscriptions,
        orders,
        payments,
        expiry_sweeper,
        auto_renewal,
    })
}
