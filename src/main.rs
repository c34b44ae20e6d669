use std::sync::Arc;

use anyhow::Context;

use storehaus_api::auth::revocation::InMemoryRevocationStore;
use storehaus_api::auth::TokenService;
use storehaus_api::tasks::LogEmailSink;
use storehaus_api::{app, config, db, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    if config.jwt_secret == config::DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET not set; using the development default");
    }

    let pool = db::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;
    db::migrate(&pool).await.context("failed to run schema migration")?;

    // The revocation set starts empty on every boot; tokens revoked by a
    // previous process are honored again until they expire. Swap in a
    // shared RevocationStore for multi-process deployments.
    let revoked = Arc::new(InMemoryRevocationStore::default());
    let tokens = TokenService::new(
        &config.jwt_secret,
        config.access_token_ttl_secs,
        config.refresh_token_ttl_secs,
        revoked,
    );

    let state = AppState::new(pool, tokens, Arc::new(LogEmailSink));
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Storehaus API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
