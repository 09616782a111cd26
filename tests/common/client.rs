//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per endpoint. Redirects are not followed,
//! so tests can assert on the `Location` of every browser flow.

use super::constants::*;
use reqwest::{header::LOCATION, redirect::Policy, Client, Response};
use serde_json::Value;
use std::time::Duration;

pub struct TestClient {
    client: Client,
    pub base_url: String,
}

impl TestClient {
    /// Creates an anonymous client with its own cookie jar.
    pub fn new(base_url: String) -> Self {
        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self { client, base_url }
    }

    /// Creates a client already holding a browser session for `email`.
    pub async fn logged_in(base_url: String, email: &str) -> Self {
        let client = Self::new(base_url);
        let response = client.login(email).await;
        assert_eq!(response.status(), 303, "login of {} failed", email);
        client
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Browser routes
    // ========================================================================

    pub async fn up(&self) -> Response {
        self.get("/up").await
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Request failed")
    }

    pub async fn login_page(&self) -> Response {
        self.get("/login").await
    }

    pub async fn login(&self, email: &str) -> Response {
        self.client
            .post(self.url("/login"))
            .form(&[("email", email)])
            .send()
            .await
            .expect("Login request failed")
    }

    pub async fn logout(&self) -> Response {
        self.client
            .post(self.url("/logout"))
            .send()
            .await
            .expect("Logout request failed")
    }

    pub async fn random_page(&self) -> Response {
        self.get("/pokemon/random").await
    }

    pub async fn catch(&self, identifier: &str) -> Response {
        self.client
            .post(self.url(&format!("/pokemon/{}/catch", identifier)))
            .send()
            .await
            .expect("Catch request failed")
    }

    pub async fn collection_page(&self) -> Response {
        self.get("/caught").await
    }

    pub async fn release(&self, id: &str) -> Response {
        self.client
            .post(self.url(&format!("/caught/{}/release", id)))
            .send()
            .await
            .expect("Release request failed")
    }

    // ========================================================================
    // JSON API
    // ========================================================================

    pub async fn api_login(&self, email: &str) -> Response {
        self.client
            .post(self.url("/api/login"))
            .json(&serde_json::json!({ "email": email }))
            .send()
            .await
            .expect("API login request failed")
    }

    /// Logs in through the API and returns the bearer token.
    pub async fn api_token(&self, email: &str) -> String {
        let response = self.api_login(email).await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.expect("Invalid login body");
        body["token"]
            .as_str()
            .expect("Missing token")
            .to_string()
    }

    pub async fn api_get(&self, path: &str, token: Option<&str>) -> Response {
        let mut request = self.client.get(self.url(&format!("/api{}", path)));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("API request failed")
    }

    pub async fn api_refresh(&self, token: &str) -> Response {
        self.client
            .post(self.url("/api/refresh"))
            .bearer_auth(token)
            .send()
            .await
            .expect("Refresh request failed")
    }

    pub async fn api_catch(&self, identifier: &str, token: &str) -> Response {
        self.client
            .post(self.url(&format!("/api/pokemon/{}/catch", identifier)))
            .bearer_auth(token)
            .send()
            .await
            .expect("API catch request failed")
    }

    pub async fn api_release(&self, id: &str, token: &str) -> Response {
        self.client
            .delete(self.url(&format!("/api/users/caught_pokemons/{}", id)))
            .bearer_auth(token)
            .send()
            .await
            .expect("API release request failed")
    }
}

/// Path of a redirect response.
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|l| l.to_str().ok())
        .unwrap_or_default()
}
