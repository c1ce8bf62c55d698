use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskflowError {
    #[error("Internal server error")]
    InternalError,
    #[error("The server is not configured to do this. Error message: `{0}`")]
    Misconfigured(String),
    #[error("The request was only partially completed. Error message: `{0}`")]
    PartiallyCompleted(String),
    #[error("Unauthorized request. Error message: `{0}`")]
    Unauthorized(String),
}

impl actix_web::error::ResponseError for TaskflowError {
    fn status_code(&self) -> StatusCode {
        match *self {
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Misconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PartiallyCompleted(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header((header::CONTENT_TYPE, "text/html; charset=utf-8"))
            .body(self.to_string())
    }
}
