use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::{config::config_model::Schedule, jobs::SubscriptionJobs};

/// Registers the subscription jobs on their cron expressions and starts the scheduler.
pub async fn start(schedule: &Schedule, jobs: SubscriptionJobs) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let expiry_jobs = jobs.clone();
    scheduler
        .add(Job::new_async(schedule.expiry_check.as_str(), move |_uuid, _l| {
            let jobs = expiry_jobs.clone();
            Box::pin(async move {
                jobs.run_expiry_check().await;
            })
        })?)
        .await?;
    info!(cron = %schedule.expiry_check, "Scheduled: subscription expiry check");

    let reminder_jobs = jobs.clone();
    scheduler
        .add(Job::new_async(schedule.renewal_reminder.as_str(), move |_uuid, _l| {
            let jobs = reminder_jobs.clone();
            Box::pin(async move {
                jobs.run_renewal_reminder().await;
            })
        })?)
        .await?;
    info!(cron = %schedule.renewal_reminder, "Scheduled: renewal reminder");

    let renewal_jobs = jobs;
    scheduler
        .add(Job::new_async(schedule.auto_renewal.as_str(), move |_uuid, _l| {
            let jobs = renewal_jobs.clone();
            Box::pin(async move {
                jobs.run_auto_renewal().await;
            })
        })?)
        .await?;
    info!(cron = %schedule.auto_renewal, "Scheduled: auto-renewal");

    info!("Starting job scheduler");
    scheduler.start().await?;

    Ok(scheduler)
}
