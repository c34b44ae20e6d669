use once_cell::sync::Lazy;
use std::env;

/// Fallback signing secret for local development. Production deployments
/// must set JWT_SECRET; main logs a warning when this default is in use.
pub const DEV_JWT_SECRET: &str = "storehaus-dev-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data.db".to_string());

        let port = env::var("STOREHAUS_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(5005);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());

        let access_token_ttl_secs = env::var("ACCESS_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(15 * 60);

        let refresh_token_ttl_secs = env::var("REFRESH_TOKEN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(30 * 24 * 60 * 60);

        Self {
            database_url,
            port,
            jwt_secret,
            access_token_ttl_secs,
            refresh_token_ttl_secs,
        }
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Global configuration singleton, loaded from the environment on first use.
pub fn config() -> &'static AppConfig {
    &CONFIG
}
