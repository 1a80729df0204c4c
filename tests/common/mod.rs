#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{json, Value};

use quill_api::state::AppState;

pub struct TestServer {
    pub base_url: String,
}

/// Boots the app with fresh in-memory stores on an ephemeral port. Each test
/// gets its own server so state never leaks between tests.
pub async fn spawn_server() -> Result<TestServer> {
    let app = quill_api::app(AppState::in_memory());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("failed to bind test listener")?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });

    Ok(TestServer {
        base_url: format!("http://{addr}"),
    })
}

pub async fn join(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
    nickname: &str,
) -> Result<Value> {
    let res = client
        .post(format!("{base_url}/api/v1/members"))
        .json(&json!({ "username": username, "password": password, "nickname": nickname }))
        .send()
        .await?;
    anyhow::ensure!(res.status().as_u16() == 201, "join failed: {}", res.status());
    Ok(res.json().await?)
}

/// Registers and logs in; returns (api_key, access_token).
pub async fn register_and_login(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    password: &str,
    nickname: &str,
) -> Result<(String, String)> {
    join(client, base_url, username, password, nickname).await?;

    let res = client
        .post(format!("{base_url}/api/v1/members/login"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;
    anyhow::ensure!(res.status().as_u16() == 200, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    let api_key = body["data"]["apiKey"].as_str().unwrap_or_default().to_string();
    let access_token = body["data"]["accessToken"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    anyhow::ensure!(!api_key.is_empty() && !access_token.is_empty());
    Ok((api_key, access_token))
}

pub async fn create_post(
    client: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    title: &str,
    content: &str,
) -> Result<i64> {
    let res = client
        .post(format!("{base_url}/api/v1/posts"))
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&json!({ "title": title, "content": content }))
        .send()
        .await?;
    anyhow::ensure!(
        res.status().as_u16() == 201,
        "create post failed: {}",
        res.status()
    );
    let body: Value = res.json().await?;
    body["data"]["id"]
        .as_i64()
        .context("post id missing from response")
}

/// Raw `Set-Cookie` line for `name`, attributes included.
pub fn set_cookie_line(res: &reqwest::Response, name: &str) -> Option<String> {
    res.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|line| line.starts_with(&format!("{name}=")))
        .map(str::to_string)
}

/// Just the value portion of a `Set-Cookie` for `name`.
pub fn set_cookie_value(res: &reqwest::Response, name: &str) -> Option<String> {
    let line = set_cookie_line(res, name)?;
    let pair = line.split(';').next()?;
    Some(pair.splitn(2, '=').nth(1)?.to_string())
}
