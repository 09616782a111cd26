//! End-to-end tests for browser sessions and API tokens

mod common;

use common::{location, TestClient, TestServer, OTHER_USER_EMAIL, TEST_USER_EMAIL, UNKNOWN_EMAIL};
use serde_json::Value;
use std::time::Duration;

#[tokio::test]
async fn test_health_check_needs_no_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.up().await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_protected_pages_redirect_to_login() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    for path in ["/", "/pokemon/random", "/caught"] {
        let response = client.get(path).await;
        assert_eq!(response.status(), 303, "{} should redirect", path);
        assert_eq!(location(&response), "/login");
    }

    let response = client.login_page().await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Log in"));
}

#[tokio::test]
async fn test_login_sets_session_and_welcomes_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("  ASH@Example.com ").await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");

    let response = client.random_page().await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains(&format!("Welcome back, {}!", TEST_USER_EMAIL)));
    assert!(body.contains("appeared!"));

    // The notice is shown only once.
    let body = client.random_page().await.text().await.unwrap();
    assert!(!body.contains("Welcome back"));
}

#[tokio::test]
async fn test_login_with_unknown_email_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(UNKNOWN_EMAIL).await;
    assert_eq!(response.status(), 422);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("Email not found. Please check your email address."));

    let response = client.collection_page().await;
    assert_eq!(response.status(), 303);
}

#[tokio::test]
async fn test_login_page_redirects_when_already_logged_in() {
    let server = TestServer::spawn().await;
    let client = TestClient::logged_in(server.base_url.clone(), TEST_USER_EMAIL).await;

    let response = client.login_page().await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_logout_ends_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::logged_in(server.base_url.clone(), TEST_USER_EMAIL).await;

    let response = client.logout().await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");

    let response = client.login_page().await;
    assert_eq!(response.status(), 200);
    assert!(response
        .text()
        .await
        .unwrap()
        .contains("You have been logged out."));

    let response = client.collection_page().await;
    assert_eq!(response.status(), 303);
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_sessions_are_independent_per_client() {
    let server = TestServer::spawn().await;
    let ash = TestClient::logged_in(server.base_url.clone(), TEST_USER_EMAIL).await;
    let misty = TestClient::logged_in(server.base_url.clone(), OTHER_USER_EMAIL).await;

    ash.logout().await;

    assert_eq!(ash.collection_page().await.status(), 303);
    assert_eq!(misty.collection_page().await.status(), 200);
}

#[tokio::test]
async fn test_api_login_returns_token_and_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.api_login(TEST_USER_EMAIL).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], TEST_USER_EMAIL);

    let response = client.api_login(UNKNOWN_EMAIL).await;
    assert_eq!(response.status(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "User not found");

    let response = client.api_login("   ").await;
    assert_eq!(response.status(), 422);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Email is required");
}

#[tokio::test]
async fn test_api_rejects_missing_and_forged_tokens() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.api_get("/caught_pokemons", None).await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");

    let response = client.api_get("/caught_pokemons", Some("not.a.jwt")).await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");
}

#[tokio::test]
async fn test_api_rejects_expired_tokens() {
    let server = TestServer::spawn_with_jwt_ttl(0.0, Duration::ZERO).await;
    let client = TestClient::new(server.base_url.clone());
    let token = client.api_token(TEST_USER_EMAIL).await;

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let response = client.api_get("/caught_pokemons", Some(&token)).await;
    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Token has expired");
}

#[tokio::test]
async fn test_api_refresh_issues_working_token() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    let token = client.api_token(TEST_USER_EMAIL).await;

    let response = client.api_refresh(&token).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    let refreshed = body["token"].as_str().unwrap();
    assert_eq!(body["user"]["email"], TEST_USER_EMAIL);

    let response = client.api_get("/caught_pokemons", Some(refreshed)).await;
    assert_eq!(response.status(), 200);
}
