use std::sync::Arc;
use taskflow_api::Application;
use taskflow_infra::{InMemoryNotifier, StaticSys, TaskflowContext};
use taskflow_sdk::TaskflowSDK;

// Sun Feb 21 2021 00:00:00 UTC
pub const NOW: i64 = 1613865600000;

pub struct TestApp {
    pub ctx: TaskflowContext,
    pub notifier: Arc<InMemoryNotifier>,
    pub address: String,
}

/// In memory context frozen at `NOW` without the periodic reminder job
pub fn test_context(notifier: InMemoryNotifier) -> (TaskflowContext, Arc<InMemoryNotifier>) {
    let notifier = Arc::new(notifier);
    let mut ctx = TaskflowContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.reminder_job_interval_secs = 0;
    ctx.sys = Arc::new(StaticSys(NOW));
    ctx.notifier = notifier.clone();
    (ctx, notifier)
}

// Launch the application as a background task
pub async fn spawn_app_with(notifier: InMemoryNotifier) -> (TestApp, TaskflowSDK) {
    let (ctx, notifier) = test_context(notifier);
    let application = Application::new(ctx.clone())
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = TaskflowSDK::new(address.clone(), ctx.config.trigger_secret.clone());
    let app = TestApp {
        ctx,
        notifier,
        address,
    };
    (app, sdk)
}

pub async fn spawn_app() -> (TestApp, TaskflowSDK) {
    spawn_app_with(InMemoryNotifier::new()).await
}
