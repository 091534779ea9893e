#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use certadm_api::{
    auth::JwtVerifier, config::CertAdmApiConfig, context::ApiContext,
    guard::DefaultCredentialGuard, server,
};
use certadm_db::{
    models::{ADMIN_PASSWORD_KEY, DbCertificate},
    password::{BcryptCompare, DEFAULT_ADMIN_PASSWORD, hash_password_with_cost},
    storage::{Storage, memory::MemoryStorage},
};
use clap::Parser;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use serde_json::json;

pub const SECRET: &str = "certadm-integration-secret";

// Minimum bcrypt cost keeps the suite fast.
const TEST_COST: u32 = 4;

pub fn token(audience: &str, admin: bool) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        &json!({
            "aud": audience,
            "admin": admin,
            "exp": chrono::Utc::now().timestamp() + 600,
        }),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn alice_cert() -> DbCertificate {
    DbCertificate::issued(42, "C=US, O=Example, CN=alice.example.com")
}

pub fn hash(password: &str) -> String {
    hash_password_with_cost(password, TEST_COST).unwrap()
}

/// A store whose admin password has been rotated away from the default.
pub fn rotated_store(certificates: Vec<DbCertificate>) -> Arc<MemoryStorage> {
    Arc::new(
        MemoryStorage::with_certificates(certificates)
            .with_config(ADMIN_PASSWORD_KEY, &hash("rotated-admin-password")),
    )
}

/// A freshly bootstrapped store still carrying the default admin password.
pub fn default_password_store(certificates: Vec<DbCertificate>) -> Arc<MemoryStorage> {
    Arc::new(
        MemoryStorage::with_certificates(certificates)
            .with_config(ADMIN_PASSWORD_KEY, &hash(DEFAULT_ADMIN_PASSWORD)),
    )
}

pub fn app<S: Storage>(store: Arc<S>) -> TestServer {
    let config = CertAdmApiConfig::parse_from(["certadm-api", "--token-secret", SECRET]);
    let verifier = Arc::new(JwtVerifier::new(
        DecodingKey::from_secret(SECRET.as_bytes()),
        Algorithm::HS256,
    ));
    let guard = DefaultCredentialGuard::new(
        store.clone(),
        Arc::new(BcryptCompare),
        server::guard_config(),
    );

    let context = ApiContext::new(config, store, verifier, guard);
    let (router, _) = server::make(context).unwrap();
    TestServer::new(router).unwrap()
}
