use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;
use wiremock::{
    matchers::{any, body_string, method, path},
    Mock, ResponseTemplate,
};

use crate::helpers::{message_of, TestApp, WEBHOOK_SECRET};

const VALUE_PATH: &str = "/values/marketplace_installs";

#[tokio::test]
async fn get_installs_returns_count_and_remaining() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("42"))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app.get_installs().await?;

    assert_eq!(StatusCode::OK, res.status());
    assert_eq!(
        "public, max-age=60",
        res.headers()
            .get("cache-control")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    );
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 42, "remaining": 58, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn get_installs_missing_key_reads_as_zero() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app.get_installs().await?;

    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 0, "remaining": 100, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn get_installs_degrades_to_zero_on_store_error() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app.get_installs().await?;

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 0, "remaining": 100, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn get_installs_degrades_to_zero_when_store_unconfigured() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.counter_config = None).await?;

    let res = app.get_installs().await?;

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 0, "remaining": 100, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn post_installs_sets_absolute_count() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("PUT"))
        .and(path(VALUE_PATH))
        .and(body_string("25"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.kv_server)
        .await;
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("25"))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app
        .post_installs(&json!({"count": 25}), Some(WEBHOOK_SECRET))
        .await?;

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 25, "remaining": 75, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn post_installs_increments_current_value() -> Result<()> {
    let app = TestApp::spawn().await?;

    // One read before the write, one re-read after.
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("5"))
        .expect(2)
        .mount(&app.kv_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(VALUE_PATH))
        .and(body_string("6"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app
        .post_installs(&json!({"increment": true}), Some(WEBHOOK_SECRET))
        .await?;

    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}

#[tokio::test]
async fn post_installs_decrement_floors_at_zero() -> Result<()> {
    let app = TestApp::spawn().await?;

    // Missing key reads as 0, decrement must not write -1.
    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(2)
        .mount(&app.kv_server)
        .await;
    Mock::given(method("PUT"))
        .and(path(VALUE_PATH))
        .and(body_string("0"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app
        .post_installs(&json!({"decrement": true}), Some(WEBHOOK_SECRET))
        .await?;

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 0, "remaining": 100, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn post_installs_without_op_reads_back_unchanged() -> Result<()> {
    let app = TestApp::spawn().await?;

    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("13"))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app.post_installs(&json!({}), Some(WEBHOOK_SECRET)).await?;

    assert_eq!(StatusCode::OK, res.status());
    let body: serde_json::Value = res.json().await?;
    assert_eq!(json!({"installs": 13, "remaining": 87, "maxSpots": 100}), body);

    Ok(())
}

#[tokio::test]
async fn post_installs_bad_token_is_unauthorized_and_never_writes() -> Result<()> {
    let app = TestApp::spawn().await?;

    // No request at all may reach the store.
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.kv_server)
        .await;

    for token in [Some("wrong-token"), None] {
        let res = app.post_installs(&json!({"count": 1}), token).await?;
        assert_eq!(StatusCode::UNAUTHORIZED, res.status());
        assert_eq!("Unauthorized", message_of(res).await?);
    }

    Ok(())
}

#[tokio::test]
async fn post_installs_unconfigured_store_is_500() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.counter_config = None).await?;

    let res = app
        .post_installs(&json!({"count": 1}), Some(WEBHOOK_SECRET))
        .await?;

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    assert_eq!("KV not available", message_of(res).await?);

    Ok(())
}

#[tokio::test]
async fn post_installs_no_secret_configured_skips_auth() -> Result<()> {
    let app = TestApp::spawn_with(|config| config.webhook_config = None).await?;

    Mock::given(method("GET"))
        .and(path(VALUE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("1"))
        .expect(1)
        .mount(&app.kv_server)
        .await;

    let res = app.post_installs(&json!({}), None).await?;
    assert_eq!(StatusCode::OK, res.status());

    Ok(())
}
