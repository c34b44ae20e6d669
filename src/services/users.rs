use sqlx::SqlitePool;

use crate::db::is_unique_violation;
use crate::db::models::User;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("a user with that username or email already exists")]
    Taken,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// User persistence. Password hashing and token issuance stay out of this
/// service; it only ever sees the finished hash.
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user. The very first user becomes the bootstrap admin;
    /// everyone after that starts without privileges. The admin decision is
    /// evaluated inside the INSERT itself, so concurrent first registrations
    /// cannot both claim it. Uniqueness of both username and email is
    /// enforced by the schema.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, UserError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash, is_admin)
             VALUES (?1, ?2, ?3, NOT EXISTS (SELECT 1 FROM users))
             RETURNING id, username, email, password_hash, is_admin",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if is_unique_violation(&e) => Err(UserError::Taken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, user_id: i64) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_admin FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash, is_admin FROM users WHERE username = ?1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Returns false when no such user existed.
    pub async fn delete(&self, user_id: i64) -> Result<bool, UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
