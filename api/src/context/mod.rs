use std::sync::Arc;

use certadm_db::storage::Storage;

use crate::{auth::CredentialVerifier, config::CertAdmApiConfig, guard::DefaultCredentialGuard};

#[derive(Clone)]
pub struct ApiContext {
    pub config: Arc<CertAdmApiConfig>,
    pub db: Arc<dyn Storage>,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub guard: Arc<DefaultCredentialGuard>,
}

impl ApiContext {
    pub fn new(
        config: CertAdmApiConfig,
        db: Arc<dyn Storage>,
        verifier: Arc<dyn CredentialVerifier>,
        guard: DefaultCredentialGuard,
    ) -> Self {
        Self {
            config: Arc::new(config),
            db,
            verifier,
            guard: Arc::new(guard),
        }
    }
}
