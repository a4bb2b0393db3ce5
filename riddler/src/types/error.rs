//! Error types for Riddler
//!
//! One enum for every user-visible failure, each carrying its HTTP status
//! and a stable machine-readable code.

use hyper::StatusCode;
use serde::Serialize;

/// Main error type for Riddler operations
#[derive(Debug, thiserror::Error)]
pub enum RiddlerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email already exists")]
    DuplicateAccount,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Max attempts reached! Answer was: {answer}")]
    AttemptsExhausted { answer: String },

    #[error("Room is full")]
    RoomFull,

    #[error("Already in room")]
    AlreadyJoined,

    #[error("Already completed today's challenge")]
    AlreadyCompleted,

    #[error("{0}")]
    ServiceUnavailable(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),
}

/// JSON body for error responses
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl RiddlerError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::DuplicateAccount => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AttemptsExhausted { .. } => StatusCode::BAD_REQUEST,
            Self::RoomFull => StatusCode::BAD_REQUEST,
            Self::AlreadyJoined => StatusCode::BAD_REQUEST,
            Self::AlreadyCompleted => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::DuplicateAccount => "DUPLICATE_ACCOUNT",
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AttemptsExhausted { .. } => "ATTEMPTS_EXHAUSTED",
            Self::RoomFull => "ROOM_FULL",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::AlreadyCompleted => "ALREADY_COMPLETED",
            Self::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DB_ERROR",
            Self::Internal(_) => "INTERNAL",
            Self::Config(_) => "CONFIG",
            Self::Auth(_) => "AUTH",
        }
    }

    /// Convert to status code and JSON body for HTTP response
    pub fn into_status_code_and_body(self) -> (StatusCode, ErrorBody) {
        let status = self.status_code();
        let code = self.code();
        let answer = match &self {
            Self::AttemptsExhausted { answer } => Some(answer.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            code,
            answer,
        };
        (status, body)
    }
}

impl From<std::io::Error> for RiddlerError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for RiddlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for RiddlerError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<mongodb::error::Error> for RiddlerError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::ser::Error> for RiddlerError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Internal(format!("BSON encoding failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for RiddlerError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {}", err))
    }
}

/// Result type alias for Riddler operations
pub type Result<T> = std::result::Result<T, RiddlerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attempts_exhausted_discloses_answer() {
        let (status, body) = RiddlerError::AttemptsExhausted {
            answer: "compass".into(),
        }
        .into_status_code_and_body();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "ATTEMPTS_EXHAUSTED");
        assert_eq!(body.answer.as_deref(), Some("compass"));
        assert!(body.error.contains("compass"));
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            RiddlerError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            RiddlerError::ServiceUnavailable("none".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            RiddlerError::NotFound("Riddle".into()).to_string(),
            "Riddle not found"
        );
        assert_eq!(RiddlerError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
    }
}
