use crate::error::TaskflowError;
use actix_web::HttpRequest;
use taskflow_api_structs::send_task_reminders::TRIGGER_KEY_HEADER;
use taskflow_infra::TaskflowContext;

/// Only lets requests through that carry the configured trigger secret
pub fn protect_trigger_route(
    http_req: &HttpRequest,
    ctx: &TaskflowContext,
) -> Result<(), TaskflowError> {
    let key = http_req
        .headers()
        .get(TRIGGER_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            TaskflowError::Unauthorized(format!(
                "Missing the `{}` header",
                TRIGGER_KEY_HEADER
            ))
        })?;

    if key != ctx.config.trigger_secret {
        return Err(TaskflowError::Unauthorized(format!(
            "Invalid `{}` header",
            TRIGGER_KEY_HEADER
        )));
    }
    Ok(())
}
