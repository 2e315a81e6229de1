use anyhow::{Result, ensure};
use application::usercases::{
    auto_renewal::MAX_DAYS_BEFORE_EXPIRY, subscriptions::MAX_EXPIRING_DAYS,
};
use backend::config::config_loader::{load_shared, optional, parse_or};

use super::config_model::{DotEnvyConfig, JobSettings, Schedule};

pub const DEFAULT_EXPIRY_CHECK_CRON: &str = "0 0 2 * * *";
pub const DEFAULT_RENEWAL_REMINDER_CRON: &str = "0 0 10 * * *";
pub const DEFAULT_AUTO_RENEWAL_CRON: &str = "0 0 3 * * *";

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let schedule = Schedule {
        expiry_check: optional("CRON_EXPIRY_CHECK")
            .unwrap_or_else(|| DEFAULT_EXPIRY_CHECK_CRON.to_string()),
        renewal_reminder: optional("CRON_RENEWAL_REMINDER")
            .unwrap_or_else(|| DEFAULT_RENEWAL_REMINDER_CRON.to_string()),
        auto_renewal: optional("CRON_AUTO_RENEWAL")
            .unwrap_or_else(|| DEFAULT_AUTO_RENEWAL_CRON.to_string()),
    };

    let defaults = JobSettings::default();
    let jobs = JobSettings {
        expiry_check_days: parse_or("EXPIRY_CHECK_DAYS", defaults.expiry_check_days)?,
        renewal_reminder_days: parse_or("RENEWAL_REMINDER_DAYS", defaults.renewal_reminder_days)?,
        auto_renew_days_before: parse_or(
            "AUTO_RENEW_DAYS_BEFORE",
            defaults.auto_renew_days_before,
        )?,
        auto_renew_dry_run: parse_or("AUTO_RENEW_DRY_RUN", defaults.auto_renew_dry_run)?,
    };
    validate_jobs(&jobs)?;

    Ok(DotEnvyConfig {
        shared: load_shared()?,
        schedule,
        jobs,
    })
}

/// Rejects look-ahead windows the subscription queries would refuse at run time.
pub fn validate_jobs(jobs: &JobSettings) -> Result<()> {
    for (key, days, max) in [
        ("EXPIRY_CHECK_DAYS", jobs.expiry_check_days, MAX_EXPIRING_DAYS),
        ("RENEWAL_REMINDER_DAYS", jobs.renewal_reminder_days, MAX_EXPIRING_DAYS),
        ("AUTO_RENEW_DAYS_BEFORE", jobs.auto_renew_days_before, MAX_DAYS_BEFORE_EXPIRY),
    ] {
        ensure!(
            (1..=max).contains(&days),
            "{} is invalid: {} is outside 1..={}",
            key,
            days,
            max
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn job_settings_take_env_overrides_and_defaults() {
        unsafe {
            env::set_var("DATABASE_URL", "postgres://localhost:5432/db");
            env::set_var("REDIS_URL", "redis://localhost:6379");
            env::set_var("AUTO_RENEW_DRY_RUN", "true");
            env::set_var("RENEWAL_REMINDER_DAYS", "5");
        }

        let config = load().unwrap();

        assert!(config.jobs.auto_renew_dry_run);
        assert_eq!(config.jobs.renewal_reminder_days, 5);
        assert_eq!(config.jobs.auto_renew_days_before, 3);
        assert_eq!(config.schedule.auto_renewal, DEFAULT_AUTO_RENEWAL_CRON);
    }

    #[test]
    fn malformed_numbers_name_the_variable() {
        unsafe {
            env::set_var("EXPIRY_CHECK_DAYS_MALFORMED_FOR_TEST", "seven");
        }

        let err = parse_or("EXPIRY_CHECK_DAYS_MALFORMED_FOR_TEST", 7_i64).unwrap_err();
        assert!(err.to_string().contains("EXPIRY_CHECK_DAYS_MALFORMED_FOR_TEST"));
    }

    #[test]
    fn look_ahead_windows_beyond_thirty_days_fail_startup() {
        let too_wide = JobSettings {
            expiry_check_days: 45,
            ..JobSettings::default()
        };
        let zero = JobSettings {
            renewal_reminder_days: 0,
            ..JobSettings::default()
        };

        let err = validate_jobs(&too_wide).unwrap_err();
        assert!(err.to_string().contains("EXPIRY_CHECK_DAYS"));
        assert!(validate_jobs(&zero).unwrap_err().to_string().contains("RENEWAL_REMINDER_DAYS"));
        assert!(validate_jobs(&JobSettings::default()).is_ok());
    }
}
