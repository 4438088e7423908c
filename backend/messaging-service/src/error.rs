use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;
use thiserror::Error;

use crate::models::PairError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid filter parameter: {0}")]
    InvalidFilterParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("A conversation requires two distinct participants")]
    SelfConversation,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Server start failure: {0}")]
    StartServer(String),
}

impl From<PairError> for AppError {
    fn from(_: PairError) -> Self {
        AppError::SelfConversation
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_)
            | AppError::InvalidFilterParameter(_)
            | AppError::SelfConversation => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Config(_) | AppError::StartServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error_type = match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidFilterParameter(_) => "INVALID_FILTER_PARAMETER",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::SelfConversation => "SELF_CONVERSATION",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Config(_) | AppError::StartServer(_) => "INTERNAL_ERROR",
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        })
    }
}
