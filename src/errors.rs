use axum::http::StatusCode;
use thiserror::Error;

/// Rejections raised while turning decoded documents into records, or
/// when an aggregation is asked for something it cannot compute.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("record {record}: amount is not a finite number")]
    NonFiniteAmount { record: usize },
    #[error("record {record}: unparsable timestamp '{value}'")]
    InvalidTimestamp { record: usize, value: String },
    #[error("record {record}: timestamp {value} is outside the years {min}-{max}")]
    OutOfRange {
        record: usize,
        value: String,
        min: i32,
        max: i32,
    },
    #[error("series would span {periods} periods, more than the limit of {limit}")]
    TooManyPeriods { periods: usize, limit: usize },
    #[error("{document}: {reason}")]
    MalformedDocument { document: String, reason: String },
    #[error("moving average window must be at least 1")]
    EmptyWindow,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::internal(err)
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: err.to_string(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
