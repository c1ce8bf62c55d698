mod base;
mod reminder;
mod status;

use reminder::ReminderClient;
use status::StatusClient;
use std::sync::Arc;

pub use base::APIError;
pub(crate) use base::{APIResponse, BaseClient};
pub use taskflow_api_structs::dtos::*;
pub use taskflow_api_structs::{get_service_health, send_task_reminders};

#[derive(Clone)]
pub struct TaskflowSDK {
    pub reminder: ReminderClient,
    pub status: StatusClient,
}

impl TaskflowSDK {
    fn create(base: BaseClient) -> Self {
        let base = Arc::new(base);
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { reminder, status }
    }

    /// Client that is only able to call the public routes
    pub fn new_public(address: String) -> Self {
        Self::create(BaseClient::new(address))
    }

    pub fn new(address: String, trigger_key: String) -> Self {
        let mut base = BaseClient::new(address);
        base.set_trigger_key(trigger_key);

        Self::create(base)
    }
}
