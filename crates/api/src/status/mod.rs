use actix_web::{web, HttpResponse};
use taskflow_api_structs::get_service_health::*;
use taskflow_infra::TaskflowContext;

async fn status(ctx: web::Data<TaskflowContext>) -> HttpResponse {
    HttpResponse::Ok().json(APIResponse::new(ctx.config.reminder_job_interval_secs != 0))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
