//! Common test infrastructure for end-to-end tests
//!
//! # Usage
//!
//! ```ignore
//! mod common;
//! use common::{TestClient, TestServer, TEST_USER_EMAIL};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::logged_in(server.base_url.clone(), TEST_USER_EMAIL).await;
//!     let response = client.catch("pikachu").await;
//!     assert_eq!(response.status(), 200);
//! }
//! ```

#![allow(dead_code)]
#![allow(unused_imports)]

mod client;
mod constants;
mod fixtures;
mod server;

pub use client::{location, TestClient};
pub use constants::*;
pub use fixtures::StubLookup;
pub use server::TestServer;
