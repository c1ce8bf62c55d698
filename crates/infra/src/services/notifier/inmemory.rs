use super::{INotifier, NotifierError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub address: String,
    pub subject: String,
    pub html_body: String,
}

/// Notifier that keeps every delivered message in memory.
/// Deliveries to addresses marked as failing are rejected.
#[derive(Default)]
pub struct InMemoryNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing_addresses: Mutex<HashSet<String>>,
    attempts: AtomicUsize,
    delay: Option<Duration>,
    unconfigured: bool,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Default::default()
    }

    /// A notifier whose `ensure_ready` always fails
    pub fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Default::default()
        }
    }

    /// Every delivery takes `delay` before it completes
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn fail_for(&self, address: &str) {
        lock(&self.failing_addresses).insert(address.to_string());
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    /// Number of calls to `send`, successful or not
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    fn ensure_ready(&self) -> Result<(), NotifierError> {
        if self.unconfigured {
            return Err(NotifierError::NotConfigured(
                "In memory notifier is unconfigured".into(),
            ));
        }
        Ok(())
    }

    async fn send(
        &self,
        address: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), NotifierError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if lock(&self.failing_addresses).contains(address) {
            return Err(NotifierError::Rejected {
                status: 500,
                body: format!("Delivery to {} failed", address),
            });
        }
        lock(&self.sent).push(SentMessage {
            address: address.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}
