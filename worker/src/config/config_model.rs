use backend::config::config_model::SharedConfig;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub shared: SharedConfig,
    pub schedule: Schedule,
    pub jobs: JobSettings,
}

/// Six-field cron expressions (seconds first).
#[derive(Debug, Clone)]
pub struct Schedule {
    pub expiry_check: String,
    pub renewal_reminder: String,
    pub auto_renewal: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSettings {
    pub expiry_check_days: i64,
    pub renewal_reminder_days: i64,
    pub auto_renew_days_before: i64,
    pub auto_renew_dry_run: bool,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            expiry_check_days: 7,
            renewal_reminder_days: 7,
            auto_renew_days_before: 3,
            auto_renew_dry_run: false,
        }
    }
}
