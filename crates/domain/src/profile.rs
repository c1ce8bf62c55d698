use crate::shared::entity::ID;

/// Used in greetings when a `Profile` has no name
pub const DEFAULT_DISPLAY_NAME: &str = "there";

/// The part of a user profile that reminders need
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: ID,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// A resolved delivery target for a user
#[derive(Debug, Clone, PartialEq)]
pub struct Recipient {
    pub address: String,
    pub display_name: String,
}

impl Profile {
    /// Returns `None` when the profile has no usable email address
    pub fn recipient(&self) -> Option<Recipient> {
        let address = self.email.as_deref().map(str::trim).unwrap_or_default();
        if address.is_empty() {
            return None;
        }
        let display_name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => DEFAULT_DISPLAY_NAME.to_string(),
        };
        Some(Recipient {
            address: address.to_string(),
            display_name,
        })
    }
}
