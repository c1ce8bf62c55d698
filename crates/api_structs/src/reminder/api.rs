use crate::dtos::FailedUserDTO;
use serde::{Deserialize, Serialize};
use taskflow_domain::{DispatchResult, ID};

pub mod send_task_reminders {
    use super::*;

    /// Header carrying the secret that allows triggering a reminder run
    pub const TRIGGER_KEY_HEADER: &str = "taskflow-trigger-key";

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        /// Number of emails that were delivered
        pub sent: usize,
        pub notified_task_ids: Vec<ID>,
        pub failed_users: Vec<FailedUserDTO>,
    }

    impl APIResponse {
        /// Ids are sorted so that the response does not depend on dispatch order
        pub fn new(result: DispatchResult) -> Self {
            let mut notified_task_ids = result.notified_task_ids.into_iter().collect::<Vec<_>>();
            notified_task_ids.sort();
            let mut failed_users = result
                .failed_users
                .into_iter()
                .map(|(user_id, reason)| FailedUserDTO::new(user_id, reason))
                .collect::<Vec<_>>();
            failed_users.sort_by_key(|f| f.user_id);

            Self {
                sent: result.sent_count,
                notified_task_ids,
                failed_users,
            }
        }
    }
}
