use thiserror::Error;

use crate::scheduling::ScheduleError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error{}", .0.as_ref().map_or("".to_string(), |s| format!(": {}", s)))]
    InternalServerError(Option<String>),
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        log::error!("Database error: {}", error);
        AppError::DatabaseError(error)
    }
}

impl From<ScheduleError> for AppError {
    fn from(error: ScheduleError) -> Self {
        log::warn!("Rejected roster request: {}", error);
        AppError::BadRequest(error.to_string())
    }
}

impl AppError {
    pub fn internal_server_error_message(message: impl Into<String>) -> Self {
        AppError::InternalServerError(Some(message.into()))
    }

    pub fn internal_server_error() -> Self {
        AppError::InternalServerError(None)
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, AppError::BadRequest(_))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        log::error!("Anyhow error: {}", error);

        // Repositories wrap sqlx errors in anyhow; keep them typed.
        match error.downcast::<sqlx::Error>() {
            Ok(sqlx_err) => AppError::DatabaseError(sqlx_err),
            Err(original_error) => match original_error.downcast::<ScheduleError>() {
                Ok(schedule_err) => AppError::BadRequest(schedule_err.to_string()),
                Err(other) => AppError::InternalServerError(Some(other.to_string())),
            },
        }
    }
}
