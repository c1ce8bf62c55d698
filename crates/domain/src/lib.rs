mod profile;
mod reminder;
mod shared;
mod task;

pub use profile::{Profile, Recipient, DEFAULT_DISPLAY_NAME};
pub use reminder::{
    compute_due, group_by_owner, DispatchResult, FailureReason, ReminderCandidate, UserBatch,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use task::{InvalidPriorityError, Priority, Task};
