use serde::{Deserialize, Serialize};
use taskflow_domain::{FailureReason, ID};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FailedUserDTO {
    pub user_id: ID,
    pub reason: FailureReason,
}

impl FailedUserDTO {
    pub fn new(user_id: ID, reason: FailureReason) -> Self {
        Self { user_id, reason }
    }
}
