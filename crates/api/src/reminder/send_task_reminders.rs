use super::dispatch::{dispatch, DispatchOptions};
use super::runs::ReminderRuns;
use crate::error::TaskflowError;
use crate::shared::{guard::protect_trigger_route, usecase::UseCase};
use actix_web::{web, HttpRequest, HttpResponse};
use std::time::Duration;
use taskflow_api_structs::send_task_reminders::APIResponse;
use taskflow_domain::{compute_due, DispatchResult, ID};
use taskflow_infra::{NotifierError, TaskflowContext};
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const MARK_RETRY_BASE_DELAY_MILLIS: u64 = 100;

pub async fn send_task_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<TaskflowContext>,
    runs: web::Data<ReminderRuns>,
) -> Result<HttpResponse, TaskflowError> {
    protect_trigger_route(&http_req, &ctx)?;

    // Spawned so that a dropped request does not drop a run that already sent emails
    let run = actix_web::rt::spawn(runs.run(ctx.get_ref().clone()));
    match run.await {
        Ok(res) => res
            .map(|result| HttpResponse::Ok().json(APIResponse::new(result)))
            .map_err(TaskflowError::from),
        Err(e) => {
            error!("Reminder run did not complete. Err: {:?}", e);
            Err(TaskflowError::InternalError)
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    NotifierMisconfigured(NotifierError),
    StorageError,
    /// Reminders were delivered but their timestamps could not be stored
    MarkRemindedFailed(DispatchResult),
}

impl From<UseCaseError> for TaskflowError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotifierMisconfigured(e) => Self::Misconfigured(e.to_string()),
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::MarkRemindedFailed(result) => {
                let mut task_ids = result
                    .notified_task_ids
                    .iter()
                    .map(|id| id.as_string())
                    .collect::<Vec<_>>();
                task_ids.sort();
                Self::PartiallyCompleted(format!(
                    "{} reminder(s) were sent, but the reminder timestamps of these tasks were not updated: {}",
                    result.sent_count,
                    task_ids.join(", ")
                ))
            }
        }
    }
}

/// One complete reminder run over all users
#[derive(Debug, Default)]
pub struct SendTaskRemindersUseCase {
    /// Stops the run from starting work for more users
    pub cancel: CancellationToken,
}

impl SendTaskRemindersUseCase {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendTaskRemindersUseCase {
    type Response = DispatchResult;

    type Error = UseCaseError;

    const NAME: &'static str = "SendTaskReminders";

    async fn execute(&mut self, ctx: &TaskflowContext) -> Result<Self::Response, Self::Error> {
        ctx.notifier
            .ensure_ready()
            .map_err(UseCaseError::NotifierMisconfigured)?;

        // Every comparison and every stored timestamp of this run uses the same instant
        let now = ctx.sys.get_timestamp_millis();
        let io_timeout = ctx.config.io_timeout;

        let candidates = match timeout(io_timeout, ctx.repos.tasks.fetch_reminder_candidates())
            .await
        {
            Ok(Ok(candidates)) => candidates,
            Ok(Err(e)) => {
                warn!("Unable to fetch reminder candidates. Err: {:?}", e);
                return Err(UseCaseError::StorageError);
            }
            Err(_) => {
                warn!("Fetching reminder candidates timed out");
                return Err(UseCaseError::StorageError);
            }
        };

        let candidate_count = candidates.len();
        let due = compute_due(candidates, now);
        info!(
            "Found {} reminder candidate(s), {} due",
            candidate_count,
            due.len()
        );
        if due.is_empty() {
            info!("No tasks are due for a reminder");
            return Ok(DispatchResult::default());
        }

        let options = DispatchOptions {
            io_timeout,
            concurrency: ctx.config.dispatch_concurrency,
        };
        let result = dispatch(
            due,
            ctx.repos.profiles.as_ref(),
            ctx.notifier.as_ref(),
            &options,
            &self.cancel,
        )
        .await;

        if !result.notified_task_ids.is_empty() {
            let mut task_ids = result.notified_task_ids.iter().copied().collect::<Vec<_>>();
            task_ids.sort();
            if !mark_reminded(ctx, &task_ids, now).await {
                return Err(UseCaseError::MarkRemindedFailed(result));
            }
        }

        info!(
            "Reminder run done. Sent: {}, notified tasks: {}, failed users: {}",
            result.sent_count,
            result.notified_task_ids.len(),
            result.failed_users.len()
        );
        Ok(result)
    }
}

/// Stores `now` as the last reminder of the given tasks in one batched write.
/// Failed writes are retried with an exponential backoff.
async fn mark_reminded(ctx: &TaskflowContext, task_ids: &[ID], now: i64) -> bool {
    let attempts = ctx.config.mark_reminded_retries + 1;
    for attempt in 0..attempts {
        if attempt > 0 {
            let backoff = MARK_RETRY_BASE_DELAY_MILLIS << (attempt - 1).min(6);
            sleep(Duration::from_millis(backoff)).await;
        }
        match timeout(
            ctx.config.io_timeout,
            ctx.repos.tasks.mark_reminded(task_ids, now),
        )
        .await
        {
            Ok(Ok(updated)) => {
                if updated != task_ids.len() as u64 {
                    warn!(
                        "Marked {} of {} reminded tasks, the rest were removed during the run",
                        updated,
                        task_ids.len()
                    );
                }
                return true;
            }
            Ok(Err(e)) => warn!(
                "Attempt {} of {} at marking tasks as reminded failed. Err: {:?}",
                attempt + 1,
                attempts,
                e
            ),
            Err(_) => warn!(
                "Attempt {} of {} at marking tasks as reminded timed out",
                attempt + 1,
                attempts
            ),
        }
    }
    false
}
