use axum::{extract::Path, extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::password::{hash_password, verify_password};
use crate::db::models::User;
use crate::error::ApiError;
use crate::middleware::auth::{AuthUser, RefreshClaims};
use crate::services::users::UserService;
use crate::state::AppState;
use crate::tasks::spawn_registration_email;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /register - create a user; the plaintext password is hashed before
/// it ever reaches the service. The registration email is dispatched only
/// after the insert commits and cannot fail the request.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if body.username.trim().is_empty() || body.email.trim().is_empty() {
        return Err(ApiError::invalid_operation(
            "Username and email must not be empty.",
        ));
    }

    let password_hash = hash_password(&body.password)?;
    let user = UserService::new(state.pool().clone())
        .register(body.username.trim(), body.email.trim(), &password_hash)
        .await?;

    spawn_registration_email(state.email(), user.email, user.username);

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully." })),
    ))
}

/// POST /login - verify credentials and issue a fresh access token plus a
/// refresh token. Unknown user and wrong password are indistinguishable.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = UserService::new(state.pool().clone())
        .find_by_username(&body.username)
        .await?;

    let user = match user {
        Some(user) if verify_password(&body.password, &user.password_hash) => user,
        _ => return Err(ApiError::unauthorized("Invalid credentials.")),
    };

    let access_token = state.tokens().issue_access(user.id, user.is_admin, true)?;
    let refresh_token = state.tokens().issue_refresh(user.id)?;

    Ok(Json(json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
    })))
}

/// POST /logout - revoke the presented access token.
pub async fn logout(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, ApiError> {
    state.tokens().revoke(&user.jti);
    Ok(Json(json!({ "message": "Successfully logged out." })))
}

/// POST /refresh - exchange a refresh token for one non-fresh access
/// token. The refresh token's jti is revoked first, so every refresh
/// token is strictly single-use.
pub async fn refresh(
    State(state): State<AppState>,
    RefreshClaims(claims): RefreshClaims,
) -> Result<Json<Value>, ApiError> {
    state.tokens().revoke(&claims.jti);

    let user = UserService::new(state.pool().clone())
        .get(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials."))?;

    let access_token = state.tokens().issue_access(user.id, user.is_admin, false)?;
    Ok(Json(json!({ "access_token": access_token })))
}

/// GET /user/:id
pub async fn user_get(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = UserService::new(state.pool().clone())
        .get(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found."))?;
    Ok(Json(user))
}

/// DELETE /user/:id
pub async fn user_delete(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let deleted = UserService::new(state.pool().clone()).delete(user_id).await?;
    if !deleted {
        return Err(ApiError::not_found("User not found."));
    }
    Ok(Json(json!({ "message": "User deleted." })))
}
