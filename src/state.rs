//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::TokenService;
use crate::tasks::EmailSink;

/// Shared state: connection pool, token service (with its revocation
/// store) and the registration-email sink. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    tokens: TokenService,
    email: Arc<dyn EmailSink>,
}

impl AppState {
    pub fn new(pool: SqlitePool, tokens: TokenService, email: Arc<dyn EmailSink>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                tokens,
                email,
            }),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    pub fn tokens(&self) -> &TokenService {
        &self.inner.tokens
    }

    pub fn email(&self) -> Arc<dyn EmailSink> {
        Arc::clone(&self.inner.email)
    }
}
