use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::auth::{Claims, TokenKind};
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context extracted from a verified access token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub jti: String,
    pub fresh: bool,
    pub is_admin: bool,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            jti: claims.jti,
            fresh: claims.fresh,
            is_admin: claims.is_admin,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.tokens().verify(&token, TokenKind::Access)?;
        Ok(AuthUser::from(claims))
    }
}

/// Verified claims of a refresh token, for the token-exchange endpoint.
#[derive(Clone, Debug)]
pub struct RefreshClaims(pub Claims);

#[async_trait]
impl FromRequestParts<AppState> for RefreshClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = state.tokens().verify(&token, TokenKind::Refresh)?;
        Ok(RefreshClaims(claims))
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Request does not contain an access token."))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format."))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format.",
        )),
    }
}
