use serde::{Deserialize, Serialize};

pub mod get_service_health {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub message: String,
        /// Whether reminder runs are started periodically by the server itself
        pub reminder_job_enabled: bool,
    }

    impl APIResponse {
        pub fn new(reminder_job_enabled: bool) -> Self {
            Self {
                message: "Taskflow reminders are up".into(),
                reminder_job_enabled,
            }
        }
    }
}
