use anyhow::Result;
use backend::wiring;
use infra::observability::init_observability;
use tracing::{error, info};
use worker::{config, jobs::SubscriptionJobs, scheduler};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_observability("worker")?;

    let dotenvy_env = config::config_loader::load()?;
    info!(stage = %dotenvy_env.shared.stage, "ENV has been loaded");

    let services = wiring::build_services(&dotenvy_env.shared).await?;
    let jobs = SubscriptionJobs::new(&services, dotenvy_env.jobs.clone());

    let mut scheduler = scheduler::start(&dotenvy_env.schedule, jobs).await?;
    info!("Subscription worker started with 3 scheduled jobs");

    tokio::signal::ctrl_c().await?;
    info!("Received ctrl+C signal, stopping scheduler");
    scheduler.shutdown().await?;

    Ok(())
}
