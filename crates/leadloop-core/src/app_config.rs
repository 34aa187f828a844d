#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub linkedin_base_url: String,
    pub linkedin_request_timeout_secs: u64,
    pub linkedin_user_agent: String,
    pub linkedin_max_retries: u32,
    pub linkedin_backoff_base_secs: u64,
    pub outreach_base_url: String,
    pub outreach_api_key: String,
    pub outreach_model: String,
    pub crm_webhook_url: Option<String>,
    pub executor_batch_size: i64,
    pub executor_max_retries: i32,
    pub executor_backoff_base_secs: i64,
    pub poll_interval_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("linkedin_base_url", &self.linkedin_base_url)
            .field(
                "linkedin_request_timeout_secs",
                &self.linkedin_request_timeout_secs,
            )
            .field("linkedin_user_agent", &self.linkedin_user_agent)
            .field("linkedin_max_retries", &self.linkedin_max_retries)
            .field(
                "linkedin_backoff_base_secs",
                &self.linkedin_backoff_base_secs,
            )
            .field("outreach_base_url", &self.outreach_base_url)
            .field("outreach_api_key", &"[redacted]")
            .field("outreach_model", &self.outreach_model)
            .field("crm_webhook_url", &self.crm_webhook_url)
            .field("executor_batch_size", &self.executor_batch_size)
            .field("executor_max_retries", &self.executor_max_retries)
            .field(
                "executor_backoff_base_secs",
                &self.executor_backoff_base_secs,
            )
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}
