mod dispatch;
mod message;
mod runs;
mod send_task_reminders;

use actix_web::web;
pub use runs::ReminderRuns;
use send_task_reminders::send_task_reminders_controller;
pub use send_task_reminders::SendTaskRemindersUseCase;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/send",
        web::post().to(send_task_reminders_controller),
    );
}
