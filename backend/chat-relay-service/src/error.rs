use crate::middleware::error_handling;
use crate::models::ConversationId;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error, Clone)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("server start failure: {0}")]
    StartServer(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// Counter update against an id the store does not know. Signals state
    /// the relay cannot recover from for the current transition.
    #[error("conversation {0} not found")]
    ConversationNotFound(ConversationId),

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl AppError {
    /// Returns HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::BadRequest(_) => 400,
            AppError::ConversationNotFound(_) => 404,
            AppError::Config(_) | AppError::StartServer(_) | AppError::Database(_) => 500,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(AppError::status_code(self))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        error_handling::into_response(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::ConversationNotFound(3).status_code(), 404);
        assert_eq!(AppError::Database("boom".into()).status_code(), 500);
        assert_eq!(AppError::Config("PORT".into()).status_code(), 500);
        assert_eq!(AppError::StartServer("bind".into()).status_code(), 500);
    }

    #[test]
    fn test_conversation_not_found_message() {
        assert_eq!(
            AppError::ConversationNotFound(42).to_string(),
            "conversation 42 not found"
        );
    }
}
