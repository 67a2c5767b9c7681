use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Offering is not active: {0}")]
    OfferingNotActive(String),

    #[error("Insufficient inventory: requested {requested}, remaining {remaining}")]
    InsufficientInventory { requested: i32, remaining: i32 },

    #[error("Regeneration not allowed: {0}")]
    RegenerationNotAllowed(String),

    #[error("Prize already disposed: slot {0}")]
    AlreadyDisposed(i64),

    #[error("Disposition deadline passed for slot {0}")]
    DeadlinePassed(i64),

    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let (status_code, error_code, message) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (
                    actix_web::http::StatusCode::BAD_REQUEST,
                    "VALIDATION_ERROR",
                    msg.clone(),
                )
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (
                    actix_web::http::StatusCode::UNAUTHORIZED,
                    "AUTH_ERROR",
                    msg.clone(),
                )
            }
            AppError::NotFound(msg) => (
                actix_web::http::StatusCode::NOT_FOUND,
                "NOT_FOUND",
                msg.clone(),
            ),
            AppError::Forbidden => {
                log::warn!("Forbidden access");
                (
                    actix_web::http::StatusCode::FORBIDDEN,
                    "FORBIDDEN",
                    "Forbidden".to_string(),
                )
            }
            AppError::OfferingNotActive(msg) => (
                actix_web::http::StatusCode::CONFLICT,
                "OFFERING_NOT_ACTIVE",
                msg.clone(),
            ),
            AppError::InsufficientInventory { .. } => (
                actix_web::http::StatusCode::CONFLICT,
                "INSUFFICIENT_INVENTORY",
                self.to_string(),
            ),
            AppError::RegenerationNotAllowed(msg) => {
                log::warn!("Regeneration rejected: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "REGENERATION_NOT_ALLOWED",
                    msg.clone(),
                )
            }
            AppError::AlreadyDisposed(_) => (
                actix_web::http::StatusCode::CONFLICT,
                "ALREADY_DISPOSED",
                self.to_string(),
            ),
            AppError::DeadlinePassed(_) => (
                actix_web::http::StatusCode::BAD_REQUEST,
                "DISPOSITION_DEADLINE_PASSED",
                self.to_string(),
            ),
            AppError::ConcurrencyConflict(msg) => {
                log::warn!("Concurrency conflict: {msg}");
                (
                    actix_web::http::StatusCode::CONFLICT,
                    "CONCURRENCY_CONFLICT",
                    msg.clone(),
                )
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "Database error".to_string(),
                )
            }
            _ => {
                log::error!("Internal error: {self}");
                (
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_inventory_message_is_actionable() {
        let err = AppError::InsufficientInventory {
            requested: 10,
            remaining: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("requested 10"));
        assert!(msg.contains("remaining 3"));
    }

    #[test]
    fn test_expected_contention_errors_map_to_conflict() {
        let cases: Vec<AppError> = vec![
            AppError::InsufficientInventory {
                requested: 1,
                remaining: 0,
            },
            AppError::OfferingNotActive("status is draft".to_string()),
            AppError::AlreadyDisposed(42),
            AppError::ConcurrencyConflict("claim lost".to_string()),
        ];
        for err in cases {
            assert_eq!(
                err.error_response().status(),
                actix_web::http::StatusCode::CONFLICT
            );
        }
    }
}
