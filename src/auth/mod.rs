pub mod password;
pub mod revocation;

use std::sync::Arc;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use revocation::RevocationStore;

/// Claims carried by every issued token. Tokens are verifiable without a
/// server-side lookup except for the revocation check on `jti`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id
    pub sub: i64,
    /// Unique token identifier, used as the revocation key
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
    pub kind: TokenKind,
    /// True only for access tokens issued directly from a password login
    pub fresh: bool,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("The token has expired.")]
    Expired,

    #[error("The token has been revoked.")]
    Revoked,

    #[error("An access token is required.")]
    AccessRequired,

    #[error("A refresh token is required.")]
    RefreshRequired,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Issues, verifies and revokes bearer tokens. Revocation state lives behind
/// the injected [`RevocationStore`]; this service itself is stateless and
/// cheap to clone.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    revoked: Arc<dyn RevocationStore>,
}

impl TokenService {
    pub fn new(
        secret: &str,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
        revoked: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::seconds(access_ttl_secs),
            refresh_ttl: Duration::seconds(refresh_ttl_secs),
            revoked,
        }
    }

    /// Issue a short-lived access token carrying the admin claim.
    pub fn issue_access(
        &self,
        user_id: i64,
        is_admin: bool,
        fresh: bool,
    ) -> Result<String, AuthError> {
        self.issue(user_id, is_admin, fresh, TokenKind::Access, self.access_ttl)
    }

    /// Issue a longer-lived refresh token. Never fresh, never admin.
    pub fn issue_refresh(&self, user_id: i64) -> Result<String, AuthError> {
        self.issue(user_id, false, false, TokenKind::Refresh, self.refresh_ttl)
    }

    fn issue(
        &self,
        user_id: i64,
        is_admin: bool,
        fresh: bool,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4().to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            kind,
            fresh,
            is_admin,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature, expiry, token kind and revocation state.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::Invalid(e.to_string()),
            }
        })?;

        let claims = data.claims;

        if claims.kind != expected {
            return Err(match expected {
                TokenKind::Access => AuthError::AccessRequired,
                TokenKind::Refresh => AuthError::RefreshRequired,
            });
        }

        if self.revoked.is_revoked(&claims.jti) {
            return Err(AuthError::Revoked);
        }

        Ok(claims)
    }

    /// Insert a token identifier into the revocation set. Idempotent.
    pub fn revoke(&self, jti: &str) {
        self.revoked.revoke(jti);
    }
}
