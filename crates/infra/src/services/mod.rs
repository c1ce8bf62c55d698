mod notifier;

pub use notifier::{INotifier, InMemoryNotifier, NotifierError, ResendNotifier, SentMessage};
