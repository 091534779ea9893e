use std::sync::Arc;

use anyhow::Context;
use certadm_api::{
    auth::JwtVerifier, config::CertAdmApiConfig, context::ApiContext,
    guard::DefaultCredentialGuard, server,
};
use certadm_db::{
    password::BcryptCompare,
    storage::{Storage, mongodb::MongoDBStorage},
};
use clap::Parser;
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CertAdmApiConfig::parse();

    if !config.dump_openapi {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or("certadm_api=info,certadm_common=info,certadm_db=info".into()),
            )
            .pretty()
            .init();
    }

    let db: Arc<dyn Storage> = Arc::new(
        MongoDBStorage::new(&config.mongodb_uri)
            .await
            .context("Failed to connect to MongoDB")?,
    );

    // Dumping the OpenAPI document does not verify any token.
    let verifier = match JwtVerifier::from_config(&config) {
        Ok(verifier) => verifier,
        Err(_) if config.dump_openapi => {
            JwtVerifier::new(DecodingKey::from_secret(&[]), Algorithm::HS256)
        }
        Err(e) => return Err(e),
    };
    let verifier = Arc::new(verifier);
    let guard = DefaultCredentialGuard::new(
        Arc::clone(&db),
        Arc::new(BcryptCompare),
        server::guard_config(),
    );

    let context = ApiContext::new(config.clone(), db, verifier, guard);
    let (router, api) = server::make(context)?;

    if config.dump_openapi {
        print!("{}", api.to_pretty_json()?);
        return Ok(());
    }

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .context("Failed to bind to address")?;

    info!("Listening on http://{:?}", config.bind_addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}
