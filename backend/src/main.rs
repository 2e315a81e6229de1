use anyhow::Result;
use backend::{axum_http::http_serve, config::config_loader, wiring};
use infra::observability::init_observability;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!(stage = %dotenvy_env.shared.stage, "ENV has been loaded");

    let services = wiring::build_services(&dotenvy_env.shared).await?;

    http_serve::start(Arc::new(dotenvy_env), services).await?;

    Ok(())
}
