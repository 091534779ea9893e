mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use certadm_common::views::ApiErrorResponse;
use certadm_db::{
    models::ADMIN_PASSWORD_KEY,
    storage::{CertificateStore, ConfigStore, memory::MemoryStorage},
};
use serde_json::json;

use common::{alice_cert, app, default_password_store, hash, token};

const REVOKE: &str = "/api/v1/acme/revoke";

#[tokio::test]
async fn default_password_blocks_revocation_for_everyone() {
    let store = default_password_store(vec![alice_cert()]);
    let server = app(store.clone());

    for (audience, admin) in [("alice.example.com", false), ("ops.example.com", true)] {
        let response = server
            .post(REVOKE)
            .authorization_bearer(token(audience, admin))
            .json(&json!({ "serial_number": 42 }))
            .await;

        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            response.json::<ApiErrorResponse>().code.as_deref(),
            Some("DefaultCredentialActive")
        );
    }

    assert_eq!(store.lookup(42).await.unwrap(), Some(alice_cert()));
}

#[tokio::test]
async fn default_password_blocks_admin_routes() {
    let server = app(default_password_store(vec![alice_cert()]));

    let response = server
        .get("/api/v1/admin/certificates/42")
        .authorization_bearer(token("ops.example.com", true))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn guard_runs_before_authentication() {
    let server = app(default_password_store(vec![alice_cert()]));

    let response = server
        .post(REVOKE)
        .json(&json!({ "serial_number": 42 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_check_is_not_gated() {
    let server = app(default_password_store(vec![]));

    let response = server.get("/healthz").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "Healthy");
}

#[tokio::test]
async fn rotating_the_password_unblocks_immediately() {
    let store = default_password_store(vec![alice_cert()]);
    let server = app(store.clone());
    let alice = token("alice.example.com", false);

    let blocked = server
        .post(REVOKE)
        .authorization_bearer(alice.clone())
        .json(&json!({ "serial_number": 42 }))
        .await;
    assert_eq!(blocked.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    store
        .set_config(ADMIN_PASSWORD_KEY, &hash("a new admin password"))
        .await
        .unwrap();

    let allowed = server
        .post(REVOKE)
        .authorization_bearer(alice)
        .json(&json!({ "serial_number": 42 }))
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn unset_password_fails_closed() {
    let server = app(Arc::new(MemoryStorage::with_certificates(vec![alice_cert()])));

    let response = server
        .post(REVOKE)
        .authorization_bearer(token("alice.example.com", false))
        .json(&json!({ "serial_number": 42 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
