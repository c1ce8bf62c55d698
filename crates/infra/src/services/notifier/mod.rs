mod inmemory;
mod resend;

pub use inmemory::{InMemoryNotifier, SentMessage};
pub use resend::ResendNotifier;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifierError {
    #[error("Notifier is not configured. Error message: `{0}`")]
    NotConfigured(String),
    #[error("Unable to reach the email provider. Error message: `{0}`")]
    Connection(String),
    #[error("Email provider rejected the message. Status: {status}, Body: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers one message to one address
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Checks that the notifier is able to deliver anything at all
    fn ensure_ready(&self) -> Result<(), NotifierError> {
        Ok(())
    }

    async fn send(&self, address: &str, subject: &str, html_body: &str)
        -> Result<(), NotifierError>;
}
