use crate::reminder::ReminderRuns;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use taskflow_infra::TaskflowContext;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{info, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Allows at most one reminder run at a time
#[derive(Debug, Clone, Default)]
struct RunGuard {
    running: Arc<AtomicBool>,
}

/// Held for the duration of a run, releases the guard on drop
struct RunPermit {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: self.running.clone(),
            })
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Starts a reminder run every `reminder_job_interval_secs`, beginning at the
/// next full minute. A tick is skipped while the previous run is still going.
/// The scheduler stops once `runs` shuts down, and the shutdown waits for an
/// ongoing run to store its timestamps.
pub fn start_send_reminders_job(ctx: TaskflowContext, runs: ReminderRuns) {
    let interval_secs = ctx.config.reminder_job_interval_secs;
    if interval_secs == 0 {
        info!("Reminder job scheduler is disabled");
        return;
    }

    let scheduler = runs.clone().track(async move {
        let shutdown = runs.shutdown_token().clone();
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now.max(0) as usize, 0);
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            _ = sleep(Duration::from_secs(secs_to_next_run as u64)) => {}
        }

        let mut ticker = interval(Duration::from_secs(interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let guard = RunGuard::default();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let permit = match guard.try_acquire() {
                Some(permit) => permit,
                None => {
                    warn!("Previous reminder run is still in progress, skipping this one");
                    continue;
                }
            };
            let run = runs.run(ctx.clone());
            actix_web::rt::spawn(async move {
                let _permit = permit;
                // Errors are logged by `execute` and the next tick simply tries again
                let _ = run.await;
            });
        }
        info!("Reminder job scheduler stopped");
    });
    actix_web::rt::spawn(scheduler);
}
