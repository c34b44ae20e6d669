mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn store_create_get_list_and_duplicate_conflict() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    let res = client
        .post(format!("{}/store", server.base_url))
        .json(&json!({ "name": "Pet Shop" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .get(format!("{}/store/{}", server.base_url, store_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "Pet Shop");
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["tags"], json!([]));

    let res = client.get(format!("{}/store", server.base_url)).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn empty_store_name_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/store", server.base_url))
        .json(&json!({ "name": "   " }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn item_routes_require_a_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/item", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/item/1", server.base_url))
        .bearer_auth("garbage")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn item_create_requires_a_fresh_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (_, refresh) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    // A refreshed access token is not fresh
    let res = client
        .post(format!("{}/refresh", server.base_url))
        .bearer_auth(&refresh)
        .send()
        .await?;
    let body: Value = res.json().await?;
    let stale_access = body["access_token"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/item", server.base_url))
        .bearer_auth(&stale_access)
        .json(&json!({ "name": "Leash", "price": 12.50, "store_id": store_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // But it still works for reads
    let res = client
        .get(format!("{}/item", server.base_url))
        .bearer_auth(&stale_access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn item_crud_round_trip() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;
    let item_id =
        common::create_item(&client, &server.base_url, &access, "Leash", 12.50, store_id).await?;

    let res = client
        .get(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "Leash");
    assert_eq!(body["price"], 12.5);
    assert_eq!(body["store_id"], store_id);

    // First registered user is the bootstrap admin, so delete is allowed
    let res = client
        .delete(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn item_delete_requires_admin() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (admin_access, _) =
        common::register_and_login(&client, &server.base_url, "root", "root@x.com", "pw").await?;
    let (user_access, _) =
        common::register_and_login(&client, &server.base_url, "bob", "bob@x.com", "pw").await?;

    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;
    let item_id =
        common::create_item(&client, &server.base_url, &admin_access, "Leash", 12.50, store_id)
            .await?;

    let res = client
        .delete(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&user_access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .delete(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&admin_access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn item_create_with_bad_store_is_a_server_error() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;

    let res = client
        .post(format!("{}/item", server.base_url))
        .bearer_auth(&access)
        .json(&json!({ "name": "Leash", "price": 12.50, "store_id": 999 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    Ok(())
}

#[tokio::test]
async fn put_updates_existing_item_in_place() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;
    let item_id =
        common::create_item(&client, &server.base_url, &access, "Leash", 12.50, store_id).await?;

    let res = client
        .put(format!("{}/item/{}", server.base_url, item_id))
        .json(&json!({ "name": "Long Leash", "price": 14.999 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "Long Leash");
    // Prices keep 2-decimal semantics
    assert_eq!(body["price"], 15.0);
    assert_eq!(body["id"], item_id);
    Ok(())
}

#[tokio::test]
async fn put_upsert_needs_no_token_unlike_the_other_item_routes() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    // No Authorization header at all: the upsert still goes through
    let res = client
        .put(format!("{}/item/7", server.base_url))
        .json(&json!({ "name": "Leash", "price": 12.50, "store_id": store_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // while the read of the same item stays token-gated
    let res = client.get(format!("{}/item/7", server.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn put_creates_item_under_client_supplied_id() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    let res = client
        .put(format!("{}/item/42", server.base_url))
        .json(&json!({ "name": "Bowl", "price": 5.00, "store_id": store_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["id"], 42);

    let res = client
        .get(format!("{}/item/42", server.base_url))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    // The create arm needs a store_id
    let res = client
        .put(format!("{}/item/43", server.base_url))
        .json(&json!({ "name": "Collar", "price": 3.00 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}

#[tokio::test]
async fn concurrent_puts_to_the_same_absent_id_both_succeed() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    let put = |client: reqwest::Client, base: String, name: &'static str| async move {
        client
            .put(format!("{}/item/77", base))
            .json(&json!({ "name": name, "price": 9.99, "store_id": store_id }))
            .send()
            .await
    };

    // One create and one update, in whichever order they land; neither
    // may surface the id collision
    let (a, b) = tokio::join!(
        put(client.clone(), server.base_url.clone(), "Bowl"),
        put(client.clone(), server.base_url.clone(), "Dish")
    );
    assert_eq!(a?.status(), StatusCode::OK);
    assert_eq!(b?.status(), StatusCode::OK);

    let body: Value = client
        .put(format!("{}/item/77", server.base_url))
        .json(&json!({ "name": "Bowl", "price": 9.99 }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(body["id"], 77);
    Ok(())
}

#[tokio::test]
async fn store_delete_cascades_items_and_tags() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;
    let item_id =
        common::create_item(&client, &server.base_url, &access, "Leash", 12.50, store_id).await?;
    let tag_id = common::create_tag(&client, &server.base_url, store_id, "accessories").await?;

    let res = client
        .delete(format!("{}/store/{}", server.base_url, store_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/item/{}", server.base_url, item_id))
        .bearer_auth(&access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("{}/tag/{}", server.base_url, tag_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .delete(format!("{}/store/{}", server.base_url, store_id))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn negative_price_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let (access, _) =
        common::register_and_login(&client, &server.base_url, "alice", "alice@x.com", "pw").await?;
    let store_id = common::create_store(&client, &server.base_url, "Pet Shop").await?;

    let res = client
        .post(format!("{}/item", server.base_url))
        .bearer_auth(&access)
        .json(&json!({ "name": "Leash", "price": -1.0, "store_id": store_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    Ok(())
}
