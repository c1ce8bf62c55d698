use std::{fmt::Display, str::FromStr, time::Duration};
use taskflow_utils::create_random_secret;
use tracing::{info, warn};

const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";
const DEFAULT_FROM_ADDRESS: &str = "TaskFlow <onboarding@resend.dev>";

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret that has to be sent in the `taskflow-trigger-key` header
    /// to trigger a reminder run over http
    pub trigger_secret: String,
    /// Port for the application to run on
    pub port: usize,
    /// Api key for the email provider. Reminder runs refuse to start without it.
    pub resend_api_key: Option<String>,
    /// Endpoint of the email provider
    pub resend_api_url: String,
    /// Sender used for every reminder email
    pub reminder_from_address: String,
    /// Seconds between two reminder runs started by the job scheduler.
    /// Zero disables the job scheduler, leaving only the http trigger.
    pub reminder_job_interval_secs: u64,
    /// Upper bound for every single profile lookup, email delivery and
    /// task store update during a reminder run
    pub io_timeout: Duration,
    /// How many users are notified concurrently within one run
    pub dispatch_concurrency: usize,
    /// Extra attempts at writing the reminder timestamps after emails were sent
    pub mark_reminded_retries: usize,
}

fn env_or_default<T>(name: &str, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match std::env::var(name) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default value: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl Config {
    pub fn new() -> Self {
        let trigger_secret = match non_empty_env("REMINDER_TRIGGER_SECRET") {
            Some(secret) => secret,
            None => {
                info!("Did not find REMINDER_TRIGGER_SECRET environment variable. Going to create one.");
                let secret = create_random_secret(16);
                info!(
                    "Secret for triggering reminder runs was generated and set to: {}",
                    secret
                );
                secret
            }
        };
        let resend_api_key = non_empty_env("RESEND_API_KEY");
        if resend_api_key.is_none() {
            warn!("RESEND_API_KEY is not configured, reminder runs will fail until it is set.");
        }

        Self {
            trigger_secret,
            port: env_or_default("PORT", 5000),
            resend_api_key,
            resend_api_url: non_empty_env("RESEND_API_URL")
                .unwrap_or_else(|| DEFAULT_RESEND_API_URL.into()),
            reminder_from_address: non_empty_env("REMINDER_FROM_ADDRESS")
                .unwrap_or_else(|| DEFAULT_FROM_ADDRESS.into()),
            reminder_job_interval_secs: env_or_default("REMINDER_JOB_INTERVAL_SECS", 60),
            io_timeout: Duration::from_millis(env_or_default(
                "REMINDER_IO_TIMEOUT_MILLIS",
                10_000,
            )),
            dispatch_concurrency: env_or_default("REMINDER_DISPATCH_CONCURRENCY", 8).max(1),
            mark_reminded_retries: env_or_default("REMINDER_MARK_RETRIES", 2),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_on_invalid_values() {
        std::env::set_var("TASKFLOW_TEST_INVALID_NUMBER", "sixty");
        assert_eq!(env_or_default("TASKFLOW_TEST_INVALID_NUMBER", 60u64), 60);
        std::env::set_var("TASKFLOW_TEST_VALID_NUMBER", "15");
        assert_eq!(env_or_default("TASKFLOW_TEST_VALID_NUMBER", 60u64), 15);
        assert_eq!(env_or_default("TASKFLOW_TEST_MISSING_NUMBER", 7usize), 7);
    }

    #[test]
    fn blank_values_count_as_missing() {
        std::env::set_var("TASKFLOW_TEST_BLANK", "   ");
        assert!(non_empty_env("TASKFLOW_TEST_BLANK").is_none());
        std::env::set_var("TASKFLOW_TEST_PRESENT", " key ");
        assert_eq!(non_empty_env("TASKFLOW_TEST_PRESENT").as_deref(), Some("key"));
    }
}
