use crate::{
    auth::JwtKeys,
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    i18n::Translator,
    wiring::Services,
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        HeaderName, Method,
        header::{ACCEPT_LANGUAGE, AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub fn router(config: &DotEnvyConfig, services: Services) -> Result<Router> {
    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/plans",
            routers::plans::routes(Arc::clone(&services.plans)),
        )
        .nest(
            "/api/v1/plan-pricings",
            routers::plans::pricing_routes(Arc::clone(&services.plans)),
        )
        .nest(
            "/api/v1/subscriptions",
            routers::subscriptions::routes(services, config.payment_webhook.secret.clone()),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(Arc::new(JwtKeys::new(&config.auth.jwt_secret))))
        .layer(Extension(Arc::new(Translator::new())))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    ACCEPT_LANGUAGE,
                    HeaderName::from_static("x-app-id"),
                    HeaderName::from_static("x-developer-id"),
                    HeaderName::from_static("x-language"),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok(app)
}

pub async fn start(config: Arc<DotEnvyConfig>, services: Services) -> Result<()> {
    let app = router(&config, services)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install terminate signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
