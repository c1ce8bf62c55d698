use crate::{APIResponse, BaseClient};
use reqwest::StatusCode;
use std::sync::Arc;
use taskflow_api_structs::send_task_reminders;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Triggers one reminder run. Requires the sdk to be created with the trigger key.
    pub async fn send_reminders(&self) -> APIResponse<send_task_reminders::APIResponse> {
        self.base
            .post("reminders/send".into(), StatusCode::OK)
            .await
    }
}
