//! Error handling for the API server.
//!
//! Handlers return `Result<T, ApiError>`; the error converts into an HTTP
//! response whose body is always a JSON object with a single human-readable
//! `error` string. Internal detail is logged server-side and never exposed.
//!
//! Status mapping follows the service's taxonomy: client errors and
//! business-rule violations (unavailable space, duplicate email/plate,
//! active reservation conflicts) are 400, auth failures 401, unknown or
//! un-owned ids 404, unimplemented endpoints 501, everything unexpected a
//! generic 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parqueo_shared::auth::jwt::JwtError;
use parqueo_shared::auth::middleware::AuthError;
use parqueo_shared::auth::password::PasswordError;
use parqueo_shared::lifecycle::LifecycleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): missing/invalid fields or business-rule violation
    BadRequest(String),

    /// Unauthorized (401): missing, invalid, or expired credentials
    Unauthorized(String),

    /// Not found (404): unknown id, or id not owned by the caller
    NotFound(String),

    /// Not implemented (501): endpoints the service deliberately stubs
    NotImplemented(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response body: a single human-readable sentence.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::NotImplemented(msg) => (StatusCode::NOT_IMPLEMENTED, msg),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Convert sqlx errors to API errors, mapping constraint violations to the
/// business rule they enforce.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::BadRequest("email is already registered".to_string());
                    }
                    if constraint.contains("placa") {
                        return ApiError::BadRequest(
                            "you already have a vehicle with that plate".to_string(),
                        );
                    }
                    if constraint.contains("vehiculo_activa") {
                        return ApiError::BadRequest(
                            "this vehicle already has an active reservation".to_string(),
                        );
                    }
                    if constraint.contains("espacio_activa") {
                        return ApiError::BadRequest("space is not available".to_string());
                    }
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert lifecycle errors to API errors
impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::PastEntryTime
            | LifecycleError::SpaceUnavailable
            | LifecycleError::ActiveReservationExists
            | LifecycleError::VehicleHasActiveReservation
            | LifecycleError::AlreadyTerminated => ApiError::BadRequest(err.to_string()),
            LifecycleError::VehicleNotFound
            | LifecycleError::SpaceNotFound
            | LifecycleError::ReservationNotFound => ApiError::NotFound(err.to_string()),
            LifecycleError::Db(db_err) => ApiError::from(db_err),
        }
    }
}

/// Convert auth middleware errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = match err {
            AuthError::MissingCredentials => "No token provided",
            AuthError::InvalidFormat => "Expected a bearer token",
            AuthError::InvalidToken => "Invalid token",
        };
        ApiError::Unauthorized(message.to_string())
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Collapses validator output into the first failing message.
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .flat_map(|(_, errs)| errs.iter())
            .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .next()
            .unwrap_or_else(|| "invalid request".to_string());

        ApiError::BadRequest(message)
    }
}
