mod common;

use anyhow::Result;
use serde_json::{json, Value};

#[tokio::test]
async fn join_registers_a_member() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/members", server.base_url))
        .json(&json!({ "username": "alice", "password": "pw1234", "nickname": "Alice" }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 201);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "201-1");
    assert_eq!(body["data"]["name"], "Alice");
    assert_eq!(body["data"]["isAdmin"], false);
    assert!(body["data"]["id"].as_i64().unwrap() > 0);
    Ok(())
}

#[tokio::test]
async fn join_rejects_duplicate_usernames() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    common::join(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .post(format!("{}/api/v1/members", server.base_url))
        .json(&json!({ "username": "alice", "password": "other", "nickname": "Imposter" }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 409);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "409-1");
    Ok(())
}

#[tokio::test]
async fn join_validates_the_body() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/members", server.base_url))
        .json(&json!({ "username": "a", "password": "pw1234", "nickname": "Alice" }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "400-1");
    assert!(body["msg"].as_str().unwrap().contains("username"));
    Ok(())
}

#[tokio::test]
async fn malformed_json_gets_the_error_envelope() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/v1/members", server.base_url))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "400-2");
    Ok(())
}

#[tokio::test]
async fn login_returns_credentials_and_sets_cookies() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    common::join(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .post(format!("{}/api/v1/members/login", server.base_url))
        .json(&json!({ "username": "alice", "password": "pw1234" }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);

    let api_key_cookie = common::set_cookie_line(&res, "apiKey").expect("apiKey cookie");
    assert!(api_key_cookie.contains("Path=/"));
    assert!(api_key_cookie.contains("HttpOnly"));
    let token_cookie = common::set_cookie_line(&res, "accessToken").expect("accessToken cookie");
    assert!(token_cookie.contains("Path=/"));
    assert!(token_cookie.contains("HttpOnly"));
    assert!(!common::set_cookie_value(&res, "accessToken").unwrap().is_empty());

    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "200-1");
    assert_eq!(body["msg"], "Welcome back, Alice.");
    assert_eq!(body["data"]["item"]["name"], "Alice");
    assert!(!body["data"]["apiKey"].as_str().unwrap().is_empty());
    assert!(!body["data"]["accessToken"].as_str().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn login_rejects_a_wrong_password() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    common::join(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .post(format!("{}/api/v1/members/login", server.base_url))
        .json(&json!({ "username": "alice", "password": "wrong1" }))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 401);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "401-1");
    Ok(())
}

#[tokio::test]
async fn me_via_api_key_reissues_an_access_token() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (api_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {api_key}"))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    let token = common::set_cookie_value(&res, "accessToken").expect("reissued token cookie");
    assert!(!token.is_empty());
    let echoed = res
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(echoed, token);

    let body: Value = res.json().await?;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["name"], "Alice");
    Ok(())
}

#[tokio::test]
async fn me_via_access_token_skips_reissue() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (_, access_token) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Cookie", format!("accessToken={access_token}"))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    assert!(common::set_cookie_line(&res, "accessToken").is_none());
    Ok(())
}

#[tokio::test]
async fn stale_token_falls_back_to_the_api_key() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (api_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {api_key} wrong-access-token"))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    let token = common::set_cookie_value(&res, "accessToken").expect("fresh token cookie");
    assert!(!token.is_empty());
    let echoed = res
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert_eq!(echoed, token);
    Ok(())
}

#[tokio::test]
async fn access_token_wins_over_an_unrelated_api_key() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (alice_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;
    let (_, bob_token) =
        common::register_and_login(&client, &server.base_url, "bob", "pw1234", "Bob").await?;

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {alice_key} {bob_token}"))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await?;
    assert_eq!(body["username"], "bob");
    Ok(())
}

#[tokio::test]
async fn non_bearer_authorization_header_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", "key")
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 401);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "401-2");
    Ok(())
}

#[tokio::test]
async fn unknown_api_key_is_rejected() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", "Bearer no-such-key")
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 401);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "401-3");
    Ok(())
}

#[tokio::test]
async fn anonymous_me_requires_authentication() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 401);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "401-1");
    Ok(())
}

#[tokio::test]
async fn logout_expires_both_cookies() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{}/api/v1/members/logout", server.base_url))
        .send()
        .await?;

    assert_eq!(res.status().as_u16(), 200);
    for name in ["apiKey", "accessToken"] {
        let line = common::set_cookie_line(&res, name).expect("cleared cookie");
        assert!(line.contains("Max-Age=0"), "{line}");
        assert_eq!(common::set_cookie_value(&res, name).unwrap(), "");
    }
    Ok(())
}

#[tokio::test]
async fn profile_modification_shows_up_in_me() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (api_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .put(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&json!({ "nickname": "Alicia", "profileImgUrl": "https://img.example/a.png" }))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "200-1");

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {api_key}"))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["name"], "Alicia");
    assert_eq!(body["profileImageUrl"], "https://img.example/a.png");
    Ok(())
}

#[tokio::test]
async fn regenerating_the_api_key_invalidates_the_old_one() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (old_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .put(format!("{}/api/v1/members/me/api-key", server.base_url))
        .header("Authorization", format!("Bearer {old_key}"))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await?;
    let new_key = body["data"]["apiKey"].as_str().unwrap().to_string();
    assert_ne!(new_key, old_key);

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {old_key}"))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 401);

    let res = client
        .get(format!("{}/api/v1/members/me", server.base_url))
        .header("Authorization", format!("Bearer {new_key}"))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 200);
    Ok(())
}

#[tokio::test]
async fn adm_member_endpoints_are_admin_only() -> Result<()> {
    let server = common::spawn_server().await?;
    let client = reqwest::Client::new();
    let (admin_key, _) =
        common::register_and_login(&client, &server.base_url, "admin", "pw1234", "Admin").await?;
    let (alice_key, _) =
        common::register_and_login(&client, &server.base_url, "alice", "pw1234", "Alice").await?;

    let res = client
        .get(format!("{}/api/v1/adm/members", server.base_url))
        .header("Authorization", format!("Bearer {alice_key}"))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 403);
    let body: Value = res.json().await?;
    assert_eq!(body["resultCode"], "403-1");

    let res = client
        .get(format!("{}/api/v1/adm/members", server.base_url))
        .header("Authorization", format!("Bearer {admin_key}"))
        .send()
        .await?;
    assert_eq!(res.status().as_u16(), 200);
    let body: Value = res.json().await?;
    assert_eq!(body["totalItems"], 2);

    let res = client
        .get(format!(
            "{}/api/v1/adm/members?searchKeywordType=username&searchKeyword=ali",
            server.base_url
        ))
        .header("Authorization", format!("Bearer {admin_key}"))
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["totalItems"], 1);
    assert_eq!(body["items"][0]["username"], "alice");
    Ok(())
}
