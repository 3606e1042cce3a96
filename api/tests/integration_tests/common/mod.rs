//! Common test utilities and helpers for integration tests.
//!
//! This module provides shared functionality used across all integration tests,
//! including test app setup, seeded credentials and HTTP request helpers.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::models::OrganizationId;
use shared::storage::InMemorySignalStore;
use shared::tenancy::{InMemoryTagStore, InMemoryTokenStore, TokenDigester};
use std::sync::Arc;

/// Organization registered in every test app.
pub const ACME: &str = "acme";
/// Organization known to the token store but never registered.
pub const GLOBEX: &str = "globex";

/// Raw token bound to [`ACME`].
pub const ACME_TOKEN: &str = "acme-token";
/// Raw token bound to [`GLOBEX`].
pub const GLOBEX_TOKEN: &str = "globex-token";
/// Raw token known to the store but bound to no organization.
pub const UNBOUND_TOKEN: &str = "unbound-token";

/// Tag that exists for [`ACME`].
pub const ACME_TAG: &str = "release";

/// A running test application.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<InMemorySignalStore>,
}

pub fn org(id: &str) -> OrganizationId {
    OrganizationId::new(id).unwrap()
}

/// Creates a test app with fresh in-memory stores.
///
/// [`ACME`] is registered; the token and tag stores are seeded with the constants above.
pub fn test_app() -> TestApp {
    let store = InMemorySignalStore::new_shared();

    let tokens = InMemoryTokenStore::new(TokenDigester::new("test-secret").unwrap());
    tokens.insert_token(ACME_TOKEN, Some(org(ACME)));
    tokens.insert_token(GLOBEX_TOKEN, Some(org(GLOBEX)));
    tokens.insert_token(UNBOUND_TOKEN, None);

    let tags = InMemoryTagStore::new();
    tags.insert(org(ACME), ACME_TAG);

    let state = AppState::new(store.clone(), Arc::new(tokens), Arc::new(tags));
    state.registry().register(org(ACME));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a POST request with a raw body.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `uri` - The URI path to POST to
/// * `content_type` - Value of the `Content-Type` header
/// * `token` - Optional bearer token
/// * `body` - The request body
pub async fn post_body(
    app: Router,
    uri: &str,
    content_type: &str,
    token: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    send(app, builder.body(Body::from(body)).unwrap()).await
}

/// Helper to make a request without a body.
pub async fn request(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    send(app, builder.body(Body::empty()).unwrap()).await
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    request(app, "GET", uri, None).await
}
