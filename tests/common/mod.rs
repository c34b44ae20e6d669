#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::{json, Value};

use storehaus_api::auth::revocation::InMemoryRevocationStore;
use storehaus_api::auth::TokenService;
use storehaus_api::state::AppState;
use storehaus_api::tasks::LogEmailSink;
use storehaus_api::{app, db};

pub struct TestServer {
    pub base_url: String,
}

/// Spawn the full router in-process against a fresh in-memory database.
/// Every caller gets an isolated server, so tests never share state.
pub async fn spawn_server() -> Result<TestServer> {
    let pool = db::connect("sqlite::memory:").await?;
    db::migrate(&pool).await?;

    let revoked = Arc::new(InMemoryRevocationStore::default());
    let tokens = TokenService::new("test-secret", 900, 86400, revoked);
    let state = AppState::new(pool, tokens, Arc::new(LogEmailSink));

    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind test listener")?;
    let base_url = format!("http://127.0.0.1:{}", port);

    let router = app(state);
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server");
    });

    Ok(TestServer { base_url })
}

pub async fn register(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    email: &str,
    password: &str,
) -> Result<reqwest::Response> {
    let res = client
        .post(format!("{}/register", base_url))
        .json(&json!({ "username": username, "email": email, "password": password }))
        .send()
        .await?;
    Ok(res)
}

/// Log in and return (access_token, refresh_token).
pub async fn login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
) -> Result<(String, String)> {
    let res = client
        .post(format!("{}/login", base_url))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == 200, "login failed: {}", res.status());

    let body: Value = res.json().await?;
    let access = body["access_token"]
        .as_str()
        .context("missing access_token")?
        .to_string();
    let refresh = body["refresh_token"]
        .as_str()
        .context("missing refresh_token")?
        .to_string();
    Ok((access, refresh))
}

/// Register a user and log them in, returning (access_token, refresh_token).
pub async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    email: &str,
    password: &str,
) -> Result<(String, String)> {
    let res = register(client, base_url, username, email, password).await?;
    anyhow::ensure!(res.status() == 201, "register failed: {}", res.status());
    login(client, base_url, username, password).await
}

pub async fn create_store(
    client: &reqwest::Client,
    base_url: &str,
    name: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{}/store", base_url))
        .json(&json!({ "name": name }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == 201, "store create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["id"].as_i64().context("store id missing")
}

pub async fn create_item(
    client: &reqwest::Client,
    base_url: &str,
    access_token: &str,
    name: &str,
    price: f64,
    store_id: i64,
) -> Result<i64> {
    let res = client
        .post(format!("{}/item", base_url))
        .bearer_auth(access_token)
        .json(&json!({ "name": name, "price": price, "store_id": store_id }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == 201, "item create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["id"].as_i64().context("item id missing")
}

pub async fn create_tag(
    client: &reqwest::Client,
    base_url: &str,
    store_id: i64,
    name: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{}/store/{}/tag", base_url, store_id))
        .json(&json!({ "name": name }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == 201, "tag create failed: {}", res.status());
    let body: Value = res.json().await?;
    body["id"].as_i64().context("tag id missing")
}
