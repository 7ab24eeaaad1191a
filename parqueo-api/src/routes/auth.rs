//! Authentication endpoints.
//!
//! - `POST /auth/register` - register a new user, returns token + user
//! - `POST /auth/login` - login, returns token + user
//! - `GET /auth/me` - current user (bearer token required)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use parqueo_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::AuthContext,
        password,
    },
    models::user::{CreateUser, User, UserPublic},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    /// Password (min 8 characters)
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,

    /// Optional display name
    pub nombre: Option<String>,

    /// Optional phone number
    pub telefono: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Token + user payload returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token carrying user id and email
    pub token: String,

    /// The user, without the password hash
    pub user: UserPublic,
}

/// Registers a new user.
///
/// A duplicate email is a client error. The returned token's identity
/// matches the created user.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    // Friendlier message than the raw constraint violation; the unique
    // constraint still backs this under concurrency.
    if User::find_by_email(&state.db, &req.email).await?.is_some() {
        return Err(ApiError::BadRequest("email is already registered".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            nombre: req.nombre.unwrap_or_default(),
            telefono: req.telefono.unwrap_or_default(),
            password_hash,
        },
    )
    .await?;

    let claims = Claims::new(user.id, user.email.clone());
    let token = create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        token,
        user: user.into_public(),
    }))
}

/// Authenticates a user and returns a token.
///
/// Unknown email and wrong password produce the same response, so callers
/// cannot probe for account existence.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("invalid credentials".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(invalid());
    }

    let claims = Claims::new(user.id, user.email.clone());
    let token = create_token(&claims, state.jwt_secret())?;

    Ok(Json(AuthResponse {
        token,
        user: user.into_public(),
    }))
}

/// Returns the authenticated caller, without the password hash.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserPublic>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

    Ok(Json(user.into_public()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "long-enough-password".to_string(),
            nombre: None,
            telefono: None,
        };
        assert!(req.validate().is_ok());

        let req = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "long-enough-password".to_string(),
            nombre: None,
            telefono: None,
        };
        assert!(req.validate().is_err());

        let req = RegisterRequest {
            email: "user@example.com".to_string(),
            password: "short".to_string(),
            nombre: None,
            telefono: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let req = LoginRequest {
            email: "user@example.com".to_string(),
            password: "whatever".to_string(),
        };
        assert!(req.validate().is_ok());

        let req = LoginRequest {
            email: "not-an-email".to_string(),
            password: "whatever".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
